pub mod twitter_date_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = format!("{}", date.format(FORMAT));
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_str(&s, FORMAT)
            .map_err(serde::de::Error::custom)
            .map(|dt| dt.to_utc())
    }
}

/// Build query params for an endpoint. Each entry is `required name => value`
/// or `optional name => value` (skipped when `None`).
/// ```ignore
/// let params = build_params! {
///     required screen_name => name,
///     optional cursor => cursor,
/// };
/// ```
macro_rules! build_params {
    ($( $kind:ident $name:ident => $val:expr ),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut params: Vec<(&'static str, String)> = Vec::new();
        $( $crate::util::push_param!(params, $kind, stringify!($name), $val); )*
        params
    }};
}

macro_rules! push_param {
    ($vec:ident, required, $key:expr, $val:expr) => {
        $vec.push(($key, $val.to_string()));
    };
    ($vec:ident, optional, $key:expr, $val:expr) => {
        if let Some(ref v) = $val {
            $vec.push(($key, v.to_string()));
        }
    };
}

pub(crate) use build_params;
pub(crate) use push_param;
