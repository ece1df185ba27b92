use log::Record;

/// Returns the last segment of `full_path`, accepting both `/` and `\` as separators.
///
/// `format_caller_path("src/net/conn.rs")` is `"conn.rs"`, and an empty input
/// yields an empty string. A trailing separator yields an empty string too.
pub fn format_caller_path(full_path: &str) -> &str {
    full_path
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or("")
}

/// `file:line` of the call site, with the file shortened to its base name.
pub(crate) fn caller_location(record: &Record) -> String {
    format!(
        "{}:{}",
        record.file().map(format_caller_path).unwrap_or("<unnamed>"),
        record.line().unwrap_or(0)
    )
}

/// Caller name written as `func`.
///
/// `log` records carry no function name, so this is the module path of the
/// call site (`svc::handler`), falling back to the target.
pub(crate) fn caller_function<'a>(record: &'a Record) -> &'a str {
    record
        .module_path()
        .or_else(|| record.target().split_whitespace().next())
        .unwrap_or("<unknown>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_caller_path() {
        assert_eq!(format_caller_path("/home/dev/svc/src/main.rs"), "main.rs");
        assert_eq!(format_caller_path("C:\\dev\\svc\\src\\main.rs"), "main.rs");
        assert_eq!(format_caller_path("src\\net/conn.rs"), "conn.rs");
        assert_eq!(format_caller_path("lib.rs"), "lib.rs");
        assert_eq!(format_caller_path(""), "");
        assert_eq!(format_caller_path("src/"), "");
    }

    #[test]
    fn test_format_caller_path_matches_last_token() {
        for path in ["a/b/c", "x", "deep/er/and/deeper/file.rs", "./rel.rs"] {
            let expected = path.split('/').last().unwrap_or("");
            assert_eq!(format_caller_path(path), expected);
        }
    }

    #[test]
    fn test_caller_location() {
        let record = Record::builder()
            .file(Some("/build/svc/src/handler.rs"))
            .line(Some(42))
            .module_path(Some("svc::handler"))
            .build();
        assert_eq!(caller_location(&record), "handler.rs:42");
        assert_eq!(caller_function(&record), "svc::handler");

        let bare = Record::builder().target("svc").build();
        assert_eq!(caller_location(&bare), "<unnamed>:0");
        assert_eq!(caller_function(&bare), "svc");
    }
}
