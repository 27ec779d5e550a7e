//! Identifier splitting
//!
//! A record may carry several master bills, house bills, containers and
//! cargo control numbers. The configured [`OutputStyle`] decides how many
//! documents one event becomes and which identifiers each one carries.

use serde::{Deserialize, Serialize};

use crate::config::OutputStyle;

/// One combination of shipment identifiers reported in a single document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierSet {
    pub master_bills: Vec<String>,
    pub house_bills: Vec<String>,
    pub containers: Vec<String>,
    pub po_numbers: Vec<String>,
    pub cargo_control_numbers: Vec<String>,
}

impl IdentifierSet {
    /// Cargo control numbers as transmitted, space separated
    pub fn cargo_control_number(&self) -> Option<String> {
        (!self.cargo_control_numbers.is_empty()).then(|| self.cargo_control_numbers.join(" "))
    }
}

/// Explodes a record's identifiers into per-document tuples
///
/// Output order follows source order; the master-bill-and-container style is
/// master-major. An empty list on the split axis still yields one tuple so
/// the event is reported.
pub fn split(identifiers: &IdentifierSet, style: OutputStyle) -> Vec<IdentifierSet> {
    match style {
        OutputStyle::Standard => vec![identifiers.clone()],
        OutputStyle::PerMasterBill => per_value(identifiers, &identifiers.master_bills, |set, bill| {
            set.master_bills = bill;
        }),
        OutputStyle::PerHouseBill => per_value(identifiers, &identifiers.house_bills, |set, bill| {
            set.house_bills = bill;
        }),
        OutputStyle::PerCargoControlNumber => {
            per_value(identifiers, &identifiers.cargo_control_numbers, |set, ccn| {
                set.cargo_control_numbers = ccn;
            })
        }
        OutputStyle::PerMasterBillAndContainer => {
            per_value(identifiers, &identifiers.master_bills, |set, bill| {
                set.master_bills = bill;
            })
            .into_iter()
            .flat_map(|by_bill| {
                let containers = by_bill.containers.clone();
                per_value(&by_bill, &containers, |set, container| {
                    set.containers = container;
                })
            })
            .collect()
        }
    }
}

fn per_value<F>(identifiers: &IdentifierSet, values: &[String], assign: F) -> Vec<IdentifierSet>
where
    F: Fn(&mut IdentifierSet, Vec<String>),
{
    if values.is_empty() {
        return vec![identifiers.clone()];
    }
    values
        .iter()
        .map(|value| {
            let mut set = identifiers.clone();
            assign(&mut set, vec![value.clone()]);
            set
        })
        .collect()
}
