//! Configuration options for block encoding.
//!
//! ## Examples
//!
//! ```rust
//! use serde::Serialize;
//! use serde_blocks::{encode_into_body_with_options, Body, EncodeOptions};
//!
//! #[derive(Serialize)]
//! struct Job {
//!     #[serde(rename = "retries")]
//!     retries: Option<u32>,
//! }
//!
//! // Write absent attributes as explicit nulls.
//! let options = EncodeOptions::new().with_skip_absent_attributes(false);
//! let mut body = Body::new();
//! encode_into_body_with_options(&Job { retries: None }, &mut body, &options).unwrap();
//! assert!(body.get_attribute("retries").unwrap().is_null());
//! ```

/// Default bound on block nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Configuration options for encoding.
///
/// # Examples
///
/// ```rust
/// use serde_blocks::EncodeOptions;
///
/// let options = EncodeOptions::new();
/// assert_eq!(options.max_depth, Some(128));
/// assert!(options.skip_absent_attributes);
///
/// let unbounded = EncodeOptions::new().without_depth_limit();
/// assert_eq!(unbounded.max_depth, None);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct EncodeOptions {
    /// Deepest nesting of structs, sequences and maps accepted before failing
    /// with [`Error::Cycle`](crate::Error::Cycle).
    /// `None` disables the guard.
    pub max_depth: Option<usize>,
    /// Skip attribute fields whose value is absent (`None` or `()`), even when
    /// they are not tagged `optional`. When `false`, such fields are written as
    /// `null` attributes and only `optional` fields are skipped.
    pub skip_absent_attributes: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            skip_absent_attributes: true,
        }
    }
}

impl EncodeOptions {
    /// Creates default options (depth bound of 128, absent attributes skipped).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the nesting depth bound.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_blocks::EncodeOptions;
    ///
    /// let options = EncodeOptions::new().with_max_depth(8);
    /// assert_eq!(options.max_depth, Some(8));
    /// ```
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Removes the nesting depth bound.
    #[must_use]
    pub fn without_depth_limit(mut self) -> Self {
        self.max_depth = None;
        self
    }

    /// Sets whether absent, non-optional attributes are skipped.
    #[must_use]
    pub fn with_skip_absent_attributes(mut self, skip: bool) -> Self {
        self.skip_absent_attributes = skip;
        self
    }
}
