//! Line formatting for the console/logging boundary.
//!
//! Every function returns exactly one line with no trailing newline; the
//! sink appends it. The wording is parsed by downstream tooling and must
//! not drift.

use url::Url;

use crate::error::FetchError;

/// Progress line announcing one fetch operation against `target`.
pub fn fetching_source_index(target: &Url) -> String {
    format!("Fetching source index from {target}")
}

/// Warning emitted before attempt `next` of `max`, citing the error from
/// the attempt before it.
pub fn retry_warning(next: u32, max: u32, error: &FetchError) -> String {
    format!(
        "Retrying fetcher due to error ({next}/{max}): {} {error}",
        error.kind()
    )
}

/// Terminal line for a failed fetch operation.
pub fn terminal_error(error: &FetchError) -> String {
    error.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mirror() -> Url {
        Url::parse("http://127.0.0.1:9292/").unwrap()
    }

    fn refused() -> FetchError {
        FetchError::Connection {
            uri: mirror(),
            cause: "Connection refused (os error 111)".to_string(),
        }
    }

    #[test]
    fn test_progress_line() {
        assert_eq!(
            fetching_source_index(&mirror()),
            "Fetching source index from http://127.0.0.1:9292/"
        );
    }

    #[test]
    fn test_retry_warning_line() {
        assert_eq!(
            retry_warning(2, 4, &refused()),
            "Retrying fetcher due to error (2/4): ConnectionError Could not fetch specs \
             from http://127.0.0.1:9292/ due to underlying error \
             <Connection refused (os error 111)>"
        );
    }

    #[test]
    fn test_terminal_error_line() {
        assert_eq!(
            terminal_error(&refused()),
            "Could not fetch specs from http://127.0.0.1:9292/ due to underlying error \
             <Connection refused (os error 111)>"
        );
    }

    #[test]
    fn test_lines_never_embed_newlines() {
        for line in [
            fetching_source_index(&mirror()),
            retry_warning(3, 4, &refused()),
            terminal_error(&refused()),
        ] {
            assert!(!line.contains('\n'));
        }
    }
}
