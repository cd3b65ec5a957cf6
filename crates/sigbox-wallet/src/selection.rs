//! Box selection.
//!
//! Picks boxes to cover `transfer + fee`, largest value first so payments
//! consume as few inputs as possible. Ties break on box id, which keeps the
//! result (and therefore the input order of the transaction) deterministic.

use sigbox_core::types::{BoxId, LedgerBox};

use crate::error::WalletError;

/// Result of box selection: which boxes to spend and the change left over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxSelection {
    /// Selected boxes, in spending order.
    pub boxes: Vec<LedgerBox>,
    /// Total value of the selected boxes.
    pub total: u64,
    /// `total - transfer - fee`, returned to the sender.
    pub change: u64,
}

impl BoxSelection {
    /// Ids of the selected boxes, in spending order.
    pub fn box_ids(&self) -> Vec<BoxId> {
        self.boxes.iter().map(LedgerBox::box_id).collect()
    }
}

/// Select boxes from `candidates` covering `transfer + fee`.
///
/// Fails with `InvalidParameters` for a zero transfer, `NoBoxes` for an
/// empty candidate list, and `InsufficientFunds` when the candidates cannot
/// cover the target.
pub fn select_boxes(
    candidates: &[LedgerBox],
    transfer: u64,
    fee: u64,
) -> Result<BoxSelection, WalletError> {
    if transfer == 0 {
        return Err(WalletError::InvalidParameters(
            "transfer amount must be non-zero".into(),
        ));
    }
    if candidates.is_empty() {
        return Err(WalletError::NoBoxes);
    }
    let need = transfer.checked_add(fee).ok_or(WalletError::ValueOverflow)?;

    let mut sorted: Vec<(BoxId, &LedgerBox)> =
        candidates.iter().map(|b| (b.box_id(), b)).collect();
    sorted.sort_by(|(id_a, a), (id_b, b)| b.value().cmp(&a.value()).then(id_a.cmp(id_b)));

    let mut boxes = Vec::new();
    let mut total: u64 = 0;
    for (_, b) in sorted {
        boxes.push(b.clone());
        total = total
            .checked_add(b.value())
            .ok_or(WalletError::ValueOverflow)?;
        if total >= need {
            return Ok(BoxSelection {
                boxes,
                total,
                change: total - need,
            });
        }
    }

    Err(WalletError::InsufficientFunds { have: total, need })
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve25519_dalek::scalar::Scalar;
    use sigbox_core::crypto::PrivateInput;
    use sigbox_core::types::{BoxCandidate, Hash256, Proposition};

    fn ledger_box(value: u64, tag: u8) -> LedgerBox {
        let pk = PrivateInput::from_scalar(Scalar::from(7u64))
            .unwrap()
            .public_image();
        LedgerBox {
            candidate: BoxCandidate {
                value,
                proposition: Proposition::ProveDlog(pk),
                creation_height: 100,
            },
            transaction_id: Hash256([tag; 32]),
            index: 0,
        }
    }

    #[test]
    fn select_single_box_exact() {
        let boxes = vec![ledger_box(11, 1)];
        let sel = select_boxes(&boxes, 10, 1).unwrap();
        assert_eq!(sel.boxes.len(), 1);
        assert_eq!(sel.total, 11);
        assert_eq!(sel.change, 0);
    }

    #[test]
    fn select_with_change() {
        let boxes = vec![ledger_box(100, 1)];
        let sel = select_boxes(&boxes, 10, 1).unwrap();
        assert_eq!(sel.change, 89);
    }

    #[test]
    fn select_largest_first() {
        let boxes = vec![ledger_box(5, 1), ledger_box(50, 2), ledger_box(20, 3)];
        let sel = select_boxes(&boxes, 30, 1).unwrap();
        assert_eq!(sel.boxes.len(), 1);
        assert_eq!(sel.boxes[0].value(), 50);
    }

    #[test]
    fn select_multiple_boxes() {
        let boxes = vec![ledger_box(10, 1), ledger_box(10, 2), ledger_box(10, 3)];
        let sel = select_boxes(&boxes, 15, 1).unwrap();
        assert_eq!(sel.boxes.len(), 2);
        assert_eq!(sel.total, 20);
        assert_eq!(sel.change, 4);
    }

    #[test]
    fn select_ties_ordered_by_id() {
        let boxes = vec![ledger_box(10, 9), ledger_box(10, 1), ledger_box(10, 5)];
        let sel = select_boxes(&boxes, 25, 0).unwrap();
        let ids = sel.box_ids();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn select_deterministic_regardless_of_input_order() {
        let a = vec![ledger_box(3, 1), ledger_box(7, 2), ledger_box(7, 3)];
        let mut b = a.clone();
        b.reverse();
        assert_eq!(
            select_boxes(&a, 12, 0).unwrap(),
            select_boxes(&b, 12, 0).unwrap()
        );
    }

    #[test]
    fn select_insufficient_funds() {
        let boxes = vec![ledger_box(10, 1), ledger_box(5, 2)];
        assert_eq!(
            select_boxes(&boxes, 20, 1).unwrap_err(),
            WalletError::InsufficientFunds { have: 15, need: 21 }
        );
    }

    #[test]
    fn select_empty_candidates() {
        assert_eq!(select_boxes(&[], 1, 1).unwrap_err(), WalletError::NoBoxes);
    }

    #[test]
    fn select_zero_transfer_rejected() {
        let boxes = vec![ledger_box(10, 1)];
        assert!(matches!(
            select_boxes(&boxes, 0, 1),
            Err(WalletError::InvalidParameters(_))
        ));
    }

    #[test]
    fn select_target_overflow() {
        let boxes = vec![ledger_box(10, 1)];
        assert_eq!(
            select_boxes(&boxes, u64::MAX, 1).unwrap_err(),
            WalletError::ValueOverflow
        );
    }

    #[test]
    fn selection_fields_consistent() {
        let boxes = vec![ledger_box(40, 1), ledger_box(30, 2), ledger_box(20, 3)];
        let sel = select_boxes(&boxes, 50, 5).unwrap();
        let sum: u64 = sel.boxes.iter().map(LedgerBox::value).sum();
        assert_eq!(sel.total, sum);
        assert_eq!(sel.total, 50 + 5 + sel.change);
        assert_eq!(sel.box_ids().len(), sel.boxes.len());
    }
}
