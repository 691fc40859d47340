//! Withdrawal transaction builder.
//!
//! Sweeps a set of spendable outputs into a single creator payout, taking the
//! platform's service fee off the top and reserving a flat allowance for the
//! miner fee. Produces an unsigned transaction skeleton; signing and
//! broadcasting happen in the wallet layer that owns the keys.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::config::consts::BASIS_POINT_DENOMINATOR;

/// A spendable input: source transaction, output index, value in satoshis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub txid: String,
    pub vout: u32,
    pub value: u64,
}

/// A planned output of the withdrawal transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub address: String,
    pub value: u64,
}

/// Unsigned transaction skeleton: inputs wired from the provided UTXOs,
/// outputs ordered creator-first, service-second.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalTransaction {
    pub inputs: Vec<Utxo>,
    pub outputs: Vec<TxOutput>,
}

/// The arithmetic behind the split, reported alongside the skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalTotals {
    pub total_input: u64,
    pub service_fee: u64,
    pub payout: u64,
    pub miner_allowance: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Withdrawal {
    pub transaction: WithdrawalTransaction,
    pub totals: WithdrawalTotals,
}

/// Build an unsigned withdrawal transaction.
///
/// `service_fee = floor(total * fee_basis_points / 10000)`, forced to zero
/// when no service address is supplied. `payout = total - service_fee -
/// miner_allowance`; a payout that would go negative is a hard error, not a
/// clamp. The creator output always comes first; the service output is
/// emitted only when there is a service address and a non-zero fee.
pub fn build_withdrawal(
    utxos: Vec<Utxo>,
    creator_address: &str,
    service_address: Option<&str>,
    fee_basis_points: u16,
    miner_allowance: u64,
) -> Result<Withdrawal> {
    if utxos.is_empty() {
        bail!("No UTXOs provided");
    }
    if u64::from(fee_basis_points) > BASIS_POINT_DENOMINATOR {
        bail!(
            "Fee rate {fee_basis_points} exceeds {BASIS_POINT_DENOMINATOR} basis points"
        );
    }

    let total_input: u64 = utxos.iter().map(|u| u.value).sum();

    // u128 intermediate so total * fee cannot overflow.
    let service_fee = if service_address.is_some() {
        (u128::from(total_input) * u128::from(fee_basis_points)
            / u128::from(BASIS_POINT_DENOMINATOR)) as u64
    } else {
        0
    };

    let payout = total_input
        .checked_sub(service_fee)
        .and_then(|rest| rest.checked_sub(miner_allowance))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Withdrawal does not cover fees: total {total_input} sat, \
                 service fee {service_fee} sat, miner allowance {miner_allowance} sat"
            )
        })?;

    let mut outputs = vec![TxOutput {
        address: creator_address.to_string(),
        value: payout,
    }];
    if let Some(service) = service_address {
        if service_fee > 0 {
            outputs.push(TxOutput {
                address: service.to_string(),
                value: service_fee,
            });
        }
    }

    Ok(Withdrawal {
        transaction: WithdrawalTransaction {
            inputs: utxos,
            outputs,
        },
        totals: WithdrawalTotals {
            total_input,
            service_fee,
            payout,
            miner_allowance,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREATOR: &str = "bitcoincash:qq3afk25cg6zlsjeh4r9u8cyxtse8c26sv8as5s9hu";
    const SERVICE: &str = "bitcoincash:qr95sy3j9xwd2ap32xkykttr4cvcu7as4ydnek7dve";

    fn utxo(txid: &str, vout: u32, value: u64) -> Utxo {
        Utxo {
            txid: txid.to_string(),
            vout,
            value,
        }
    }

    #[test]
    fn test_fee_split_arithmetic() {
        let w = build_withdrawal(
            vec![utxo("aa", 0, 60_000), utxo("bb", 1, 40_000)],
            CREATOR,
            Some(SERVICE),
            100,
            1_000,
        )
        .unwrap();

        assert_eq!(w.totals.total_input, 100_000);
        assert_eq!(w.totals.service_fee, 1_000);
        // payout = total - service_fee - miner_allowance
        assert_eq!(w.totals.payout, 98_000);
        assert_eq!(
            w.totals.payout + w.totals.service_fee + w.totals.miner_allowance,
            w.totals.total_input
        );

        // Creator output first, service output second.
        assert_eq!(w.transaction.outputs.len(), 2);
        assert_eq!(w.transaction.outputs[0].address, CREATOR);
        assert_eq!(w.transaction.outputs[0].value, 98_000);
        assert_eq!(w.transaction.outputs[1].address, SERVICE);
        assert_eq!(w.transaction.outputs[1].value, 1_000);
    }

    #[test]
    fn test_inputs_wired_through() {
        let inputs = vec![utxo("cafe", 3, 5_000), utxo("beef", 0, 5_000)];
        let w = build_withdrawal(inputs.clone(), CREATOR, None, 0, 500).unwrap();
        assert_eq!(w.transaction.inputs, inputs);
    }

    #[test]
    fn test_zero_fee_rate_single_output() {
        let w = build_withdrawal(vec![utxo("aa", 0, 100_000)], CREATOR, Some(SERVICE), 0, 1_000)
            .unwrap();
        assert_eq!(w.totals.service_fee, 0);
        assert_eq!(w.totals.payout, 99_000);
        assert_eq!(w.transaction.outputs.len(), 1);
        assert_eq!(w.transaction.outputs[0].address, CREATOR);
    }

    #[test]
    fn test_no_service_address_forces_zero_fee() {
        // Non-zero fee rate, but nowhere to send it.
        let w = build_withdrawal(vec![utxo("aa", 0, 100_000)], CREATOR, None, 500, 1_000).unwrap();
        assert_eq!(w.totals.service_fee, 0);
        assert_eq!(w.totals.payout, 99_000);
        assert_eq!(w.transaction.outputs.len(), 1);
    }

    #[test]
    fn test_fee_is_floored() {
        // 33_333 * 25 / 10_000 = 83.33 -> 83
        let w = build_withdrawal(vec![utxo("aa", 0, 33_333)], CREATOR, Some(SERVICE), 25, 0)
            .unwrap();
        assert_eq!(w.totals.service_fee, 83);
        assert_eq!(w.totals.payout, 33_250);
    }

    #[test]
    fn test_empty_utxo_set_rejected() {
        let err = build_withdrawal(vec![], CREATOR, None, 100, 1_000).unwrap_err();
        assert_eq!(err.to_string(), "No UTXOs provided");
    }

    #[test]
    fn test_negative_payout_rejected() {
        // 100% fee leaves nothing for the miner allowance.
        let err = build_withdrawal(
            vec![utxo("aa", 0, 100_000)],
            CREATOR,
            Some(SERVICE),
            10_000,
            1_000,
        )
        .unwrap_err();
        assert!(err.to_string().contains("does not cover fees"));
    }

    #[test]
    fn test_allowance_larger_than_total_rejected() {
        assert!(build_withdrawal(vec![utxo("aa", 0, 500)], CREATOR, None, 0, 1_000).is_err());
    }

    #[test]
    fn test_fee_rate_above_denominator_rejected() {
        let err = build_withdrawal(vec![utxo("aa", 0, 100_000)], CREATOR, Some(SERVICE), 10_001, 0)
            .unwrap_err();
        assert!(err.to_string().contains("basis points"));
    }

    #[test]
    fn test_exact_cover_yields_zero_payout() {
        // total == fee + allowance is allowed; zero-value creator output.
        let w = build_withdrawal(
            vec![utxo("aa", 0, 10_000)],
            CREATOR,
            Some(SERVICE),
            10_000,
            0,
        )
        .unwrap();
        assert_eq!(w.totals.payout, 0);
        assert_eq!(w.totals.service_fee, 10_000);
    }
}
