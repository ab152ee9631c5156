//! Embedded user-facing messages, looked up by name.
//!
//! Kept as a table so a host can localize by shipping a replacement lookup;
//! `{}` is substituted with the formatted argument.

pub(crate) fn lookup(key: &str) -> &'static str {
    match key {
        "display-candidates" => "Display all {} possibilities? (y or n)",
        "display-candidates-yes" => "yes",
        "display-candidates-no" => "no",
        "display-more" => "--More--",
        _ => "",
    }
}

pub(crate) fn format(key: &str, arg: impl ToString) -> String {
    lookup(key).replacen("{}", &arg.to_string(), 1)
}
