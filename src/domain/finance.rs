//! Revenue allocation boxes ("caixinhas").
//!
//! Each settled order splits its net payment value into five fixed-percentage
//! bookkeeping buckets. The percentages sum to 100%.

use serde::{Deserialize, Serialize};

use crate::domain::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxKey {
    Restock,
    Marketing,
    Expansion,
    Inputs,
    Reserve,
}

impl BoxKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Restock => "restock",
            Self::Marketing => "marketing",
            Self::Expansion => "expansion",
            Self::Inputs => "inputs",
            Self::Reserve => "reserve",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Restock => "Reposicao de Estoque",
            Self::Marketing => "Marketing/Ads",
            Self::Expansion => "Escala/Expansao",
            Self::Inputs => "Insumos",
            Self::Reserve => "Reserva/MEI",
        }
    }
}

const SPLITS: [(BoxKey, u32); 5] = [
    (BoxKey::Restock, 5300),
    (BoxKey::Marketing, 1500),
    (BoxKey::Expansion, 1700),
    (BoxKey::Inputs, 500),
    (BoxKey::Reserve, 1000),
];

#[derive(Debug, Clone, Serialize)]
pub struct FinanceBox {
    pub key: BoxKey,
    pub label: &'static str,
    pub pct_bps: u32,
    pub amount_cents: Money,
}

/// Splits a net payment value across the five boxes, round-half-up per box.
pub fn split_net_value(net_value: Money) -> Vec<FinanceBox> {
    SPLITS
        .iter()
        .map(|&(key, pct_bps)| FinanceBox {
            key,
            label: key.label(),
            pct_bps,
            amount_cents: net_value.mul_bps(pct_bps),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentages_sum_to_one() {
        assert_eq!(SPLITS.iter().map(|(_, bps)| bps).sum::<u32>(), 10_000);
    }

    #[test]
    fn test_split_of_round_value() {
        let boxes = split_net_value(Money::from_cents(10_000));
        let by_key: Vec<(BoxKey, i64)> =
            boxes.iter().map(|b| (b.key, b.amount_cents.cents())).collect();
        assert_eq!(
            by_key,
            vec![
                (BoxKey::Restock, 5300),
                (BoxKey::Marketing, 1500),
                (BoxKey::Expansion, 1700),
                (BoxKey::Inputs, 500),
                (BoxKey::Reserve, 1000),
            ]
        );
    }

    #[test]
    fn test_split_rounds_per_box() {
        // 99 centavos: 52,47 / 14,85 / 16,83 / 4,95 / 9,90 -> 52 15 17 5 10
        let boxes = split_net_value(Money::from_cents(99));
        let amounts: Vec<i64> = boxes.iter().map(|b| b.amount_cents.cents()).collect();
        assert_eq!(amounts, vec![52, 15, 17, 5, 10]);
    }

    #[test]
    fn test_zero_net_value() {
        let boxes = split_net_value(Money::zero());
        assert!(boxes.iter().all(|b| b.amount_cents.is_zero()));
        assert_eq!(boxes.len(), 5);
    }
}
