#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            &$query[..$crate::floor_char_boundary(&$query, 497)].trim_end(),
            if $query.len() > 497 { "..." } else { "" },
        )
    };
}

/// Largest char boundary of `value` not exceeding `index`.
pub fn floor_char_boundary(value: &str, index: usize) -> usize {
    if index >= value.len() {
        return value.len();
    }
    (0..=index)
        .rev()
        .find(|i| value.is_char_boundary(*i))
        .unwrap_or(0)
}

/// Logs the error at the error level and returns it, ready to be propagated.
#[macro_export]
macro_rules! log_error {
    ($error:expr) => {{
        let error: $crate::Error = $error.into();
        log::error!("{:#}", error);
        error
    }};
}
