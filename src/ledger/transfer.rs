//! Resolves the destination source of a transfer from its description.
//!
//! A transfer is stored as a single expense row; the only record of where
//! the money went is a fixed phrase embedded in the free-text description,
//! e.g. "Transfer from Wallet to Bank". This module owns both sides of that
//! convention: composing descriptions for new transfers and parsing them
//! back when replaying the ledger.

use crate::transaction::Source;

/// The recognized destination phrases, checked in order. First match wins.
const DESTINATION_PHRASES: [(&str, Source); 6] = [
    ("to Wallet", Source::Wallet),
    ("to Bank", Source::Bank),
    ("to Digital Wallet", Source::DigitalWallet),
    ("→ Wallet", Source::Wallet),
    ("→ Bank", Source::Bank),
    ("→ Digital Wallet", Source::DigitalWallet),
];

/// Scan a transfer's description for the source the money was moved to.
///
/// Returns `None` when the description matches none of the known phrases.
/// Callers treat that as "destination unknown": the amount stays debited
/// from the source without being credited anywhere, so the total across all
/// sources drops by the transfer amount. This matches how stored rows have
/// always been interpreted; see DESIGN.md for the open question on
/// promoting the destination to a structured column.
pub fn transfer_destination(description: &str) -> Option<Source> {
    DESTINATION_PHRASES
        .iter()
        .find(|(phrase, _)| description.contains(phrase))
        .map(|&(_, source)| source)
}

/// The title for a new transfer transaction, e.g. "Transfer: Wallet → Bank".
pub fn transfer_title(from: Source, to: Source) -> String {
    format!("Transfer: {from} → {to}")
}

/// The description for a new transfer transaction.
///
/// The "Transfer from X to Y" suffix is load-bearing: it is what
/// [transfer_destination] parses when the ledger is replayed. An optional
/// user note is prepended without disturbing the phrase.
pub fn transfer_description(from: Source, to: Source, note: Option<&str>) -> String {
    match note {
        Some(note) if !note.is_empty() => {
            format!("{note} (Transfer from {from} to {to})")
        }
        _ => format!("Transfer from {from} to {to}"),
    }
}

#[cfg(test)]
mod transfer_destination_tests {
    use crate::transaction::Source;

    use super::{transfer_description, transfer_destination, transfer_title};

    #[test]
    fn resolves_each_to_phrase() {
        assert_eq!(
            transfer_destination("Transfer from Bank to Wallet"),
            Some(Source::Wallet)
        );
        assert_eq!(
            transfer_destination("Transfer from Wallet to Bank"),
            Some(Source::Bank)
        );
        assert_eq!(
            transfer_destination("Transfer from Wallet to Digital Wallet"),
            Some(Source::DigitalWallet)
        );
    }

    #[test]
    fn resolves_each_arrow_phrase() {
        assert_eq!(transfer_destination("Bank → Wallet"), Some(Source::Wallet));
        assert_eq!(transfer_destination("Wallet → Bank"), Some(Source::Bank));
        assert_eq!(
            transfer_destination("Wallet → Digital Wallet"),
            Some(Source::DigitalWallet)
        );
    }

    #[test]
    fn digital_wallet_is_not_mistaken_for_wallet() {
        // "to Digital Wallet" does not contain the substring "to Wallet", so
        // the earlier wallet phrase must not shadow it.
        assert_eq!(
            transfer_destination("Savings top-up (Transfer from Bank to Digital Wallet)"),
            Some(Source::DigitalWallet)
        );
    }

    #[test]
    fn first_phrase_wins_when_several_match() {
        assert_eq!(
            transfer_destination("moved to Wallet then to Bank"),
            Some(Source::Wallet)
        );
    }

    #[test]
    fn unknown_description_resolves_to_none() {
        assert_eq!(transfer_destination("Transfer into savings"), None);
        assert_eq!(transfer_destination(""), None);
    }

    #[test]
    fn composed_descriptions_round_trip() {
        for (from, to) in [
            (Source::Wallet, Source::Bank),
            (Source::Bank, Source::DigitalWallet),
            (Source::DigitalWallet, Source::Wallet),
        ] {
            let plain = transfer_description(from, to, None);
            assert_eq!(transfer_destination(&plain), Some(to), "{plain}");

            let with_note = transfer_description(from, to, Some("Rent float"));
            assert_eq!(transfer_destination(&with_note), Some(to), "{with_note}");
        }
    }

    #[test]
    fn title_names_both_sources() {
        assert_eq!(
            transfer_title(Source::Wallet, Source::DigitalWallet),
            "Transfer: Wallet → Digital Wallet"
        );
    }
}
