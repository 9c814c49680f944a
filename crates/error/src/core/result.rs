//! Result alias and wrap ergonomics.

use std::fmt;

use crate::core::chain::{WrapChain, wrap, wrap_foreign};
use crate::core::error::VelaError;

/// Result alias for operations that fail with a [`VelaError`].
pub type Result<T> = std::result::Result<T, VelaError>;

/// Wrap ergonomics for results carrying foreign errors.
///
/// Named differently from [`VelaResultExt::or_wrap`] so both traits can be
/// in scope without method ambiguity on `Result<T, VelaError>` (which also
/// satisfies the `Display` bound here).
pub trait ResultExt<T> {
    /// On error, adapt the foreign error into a chain root and attach a
    /// breadcrumb recording this call site.
    fn or_adapt(self, label: &'static str) -> std::result::Result<T, WrapChain>;
}

impl<T, E: fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    fn or_adapt(self, label: &'static str) -> std::result::Result<T, WrapChain> {
        self.map_err(|err| wrap_foreign(&err, label))
    }
}

/// Wrap ergonomics for results already carrying this system's errors.
pub trait VelaResultExt<T> {
    /// On error, attach a breadcrumb recording this call site.
    fn or_wrap(self, label: &'static str) -> std::result::Result<T, WrapChain>;
}

impl<T> VelaResultExt<T> for Result<T> {
    fn or_wrap(self, label: &'static str) -> std::result::Result<T, WrapChain> {
        self.map_err(|err| wrap(err, label))
    }
}

impl<T> VelaResultExt<T> for std::result::Result<T, WrapChain> {
    fn or_wrap(self, label: &'static str) -> std::result::Result<T, WrapChain> {
        self.map_err(|chain| wrap(chain, label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::code::ErrorCode;

    #[test]
    fn foreign_results_adapt_with_a_label() {
        let res: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::other("offline"));
        let chain = res.or_adapt("syncing state").unwrap_err();
        assert_eq!(chain.root().message(), "offline");
        assert_eq!(chain.crumbs()[0].label(), "syncing state");
    }

    #[test]
    fn vela_results_chain_labels_in_call_order() {
        let res: Result<()> = Err(VelaError::new(ErrorCode::new(3), "root"));
        let chain = res
            .or_wrap("first hop")
            .or_wrap("second hop")
            .unwrap_err();
        let labels: Vec<_> = chain.crumbs().iter().map(|c| c.label()).collect();
        assert_eq!(labels, ["first hop", "second hop"]);
    }

    #[test]
    fn success_passes_untouched() {
        let res: Result<i32> = Ok(11);
        assert_eq!(res.or_wrap("ignored").unwrap(), 11);
    }
}
