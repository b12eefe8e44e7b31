/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// Map literals produce a [`ValueMap`](crate::ValueMap), so their keys come out
/// in ascending order regardless of how they are written.
///
/// ```rust
/// use serde_blocks::{value, Value};
///
/// let config = value!({
///     "image": "busybox",
///     "cmd": ["/bin/ls"],
///     "privileged": false
/// });
///
/// let keys: Vec<_> = config.as_map().unwrap().keys().cloned().collect();
/// assert_eq!(keys, vec!["cmd", "image", "privileged"]);
/// ```
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::List(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::List(vec![$($crate::value!($elem)),*])
    };

    ({}) => {
        $crate::Value::Map($crate::ValueMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut map = $crate::ValueMap::new();
        $(
            map.insert($key.to_string(), $crate::value!($value));
        )*
        $crate::Value::Map(map)
    }};

    // Any other expression goes through the serializer.
    ($s:expr) => {
        $crate::to_value(&$s).unwrap_or($crate::Value::Null)
    };
}
