//! # Notices
//!
//! The four user-facing notification categories a cart operation can raise.
//! Every failure collapses into exactly one of these before it reaches the UI.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// A user-facing notification category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum NoticeKind {
    /// Adding a product failed for any reason other than stock.
    AddFailed,

    /// The requested quantity is more than the stock service allows.
    StockExceeded,

    /// The product to remove is not in the cart.
    RemoveFailed,

    /// The new quantity was invalid, or the update failed.
    UpdateFailed,
}

impl NoticeKind {
    /// The message shown to the shopper.
    pub const fn message(&self) -> &'static str {
        match self {
            NoticeKind::AddFailed => "Erro na adição do produto",
            NoticeKind::StockExceeded => "Quantidade solicitada fora de estoque",
            NoticeKind::RemoveFailed => "Erro na remoção do produto",
            NoticeKind::UpdateFailed => "Erro na alteração de quantidade do produto",
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_distinct() {
        let kinds = [
            NoticeKind::AddFailed,
            NoticeKind::StockExceeded,
            NoticeKind::RemoveFailed,
            NoticeKind::UpdateFailed,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a.message(), b.message());
            }
        }
        assert_eq!(
            NoticeKind::StockExceeded.to_string(),
            "Quantidade solicitada fora de estoque"
        );
    }
}
