//! Data-access functions for companies and jobs.
//!
//! Every function takes `&impl GenericClient`, so it can run on a pooled
//! connection or inside a transaction. Writes that update rows go through
//! [`build_set_clause`](crate::partial_update::build_set_clause) with a static
//! translation table per resource.

pub mod company;
pub mod job;

pub use company::{Company, CompanyDetail, CompanyFilter, CompanyJob, NewCompany};
pub use job::{Job, JobFilter, NewJob};

/// Escape `%`, `_` and `\` so `s` matches literally inside a `LIKE` pattern.
pub(crate) fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `%<escaped>%` for a case-insensitive substring match.
pub(crate) fn contains_pattern(s: &str) -> String {
    format!("%{}%", escape_like(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(contains_pattern("net"), "%net%");
        assert_eq!(contains_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}
