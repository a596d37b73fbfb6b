// backend/src/tat/hierarchy.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::classifier::{CaseClass, Classification, ClassifiedCase};
use crate::error::TatError;
use crate::models::{
    BulkUploadLeaf, BulkUploadRecord, CaseRecord, DelayedApplication, NewApplication,
    NotificationFilter, NotificationPayload,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerNode<L> {
    pub customer_id: i64,
    pub customer_name: String,
    pub tat_days: i64,
    pub branches: Vec<BranchNode<L>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchNode<L> {
    pub branch_id: i64,
    pub branch_name: String,
    pub applications: Vec<L>,
}

/// Where a row hangs in the customer → branch tree. Names are `None` when the
/// referenced customer or branch row is missing.
#[derive(Debug, Clone, Copy)]
pub struct Placement<'a> {
    pub customer_id: i64,
    pub customer_name: Option<&'a str>,
    pub tat_days: Option<i32>,
    pub branch_id: i64,
    pub branch_name: Option<&'a str>,
}

pub trait Placed {
    fn placement(&self) -> Placement<'_>;
}

impl<T: Placed + ?Sized> Placed for &T {
    fn placement(&self) -> Placement<'_> {
        (**self).placement()
    }
}

impl Placed for CaseRecord {
    fn placement(&self) -> Placement<'_> {
        Placement {
            customer_id: self.customer_id,
            customer_name: self.customer_name.as_deref(),
            tat_days: self.tat_days,
            branch_id: self.branch_id,
            branch_name: self.branch_name.as_deref(),
        }
    }
}

impl Placed for ClassifiedCase {
    fn placement(&self) -> Placement<'_> {
        self.case.placement()
    }
}

impl Placed for BulkUploadRecord {
    fn placement(&self) -> Placement<'_> {
        Placement {
            customer_id: self.customer_id,
            customer_name: self.customer_name.as_deref(),
            tat_days: self.tat_days,
            branch_id: self.branch_id,
            branch_name: self.branch_name.as_deref(),
        }
    }
}

struct CustomerAcc<L> {
    name: String,
    tat_days: i64,
    branches: BTreeMap<i64, BranchNode<L>>,
}

pub struct HierarchyAggregator<'f> {
    filter: &'f NotificationFilter,
}

impl<'f> HierarchyAggregator<'f> {
    pub fn new(filter: &'f NotificationFilter) -> Self {
        Self { filter }
    }

    /// Group rows into customer → branch → leaves.
    ///
    /// Every in-filter row opens its customer and branch; only rows for which
    /// `leaf` returns `Some` add a leaf. Empty branches and then empty
    /// customers are pruned. Leaves keep input order.
    pub fn fold<R, L>(
        &self,
        rows: impl IntoIterator<Item = R>,
        mut leaf: impl FnMut(&R) -> Option<L>,
    ) -> Vec<CustomerNode<L>>
    where
        R: Placed,
    {
        let mut customers: BTreeMap<i64, CustomerAcc<L>> = BTreeMap::new();

        for row in rows {
            let at = row.placement();
            if !self.filter.matches(at.customer_id, at.branch_id) {
                continue;
            }
            let (customer_name, branch_name) = match (at.customer_name, at.branch_name) {
                (Some(c), Some(b)) => (c, b),
                (None, _) => {
                    log_dropped(TatError::NotFound { entity: "customer", id: at.customer_id });
                    continue;
                }
                (_, None) => {
                    log_dropped(TatError::NotFound { entity: "branch", id: at.branch_id });
                    continue;
                }
            };

            let customer = customers.entry(at.customer_id).or_insert_with(|| CustomerAcc {
                name: customer_name.to_string(),
                tat_days: at.tat_days.map(i64::from).unwrap_or_default(),
                branches: BTreeMap::new(),
            });
            let branch = customer.branches.entry(at.branch_id).or_insert_with(|| BranchNode {
                branch_id: at.branch_id,
                branch_name: branch_name.to_string(),
                applications: Vec::new(),
            });
            if let Some(l) = leaf(&row) {
                branch.applications.push(l);
            }
        }

        customers
            .into_iter()
            .filter_map(|(customer_id, acc)| {
                let branches: Vec<_> = acc
                    .branches
                    .into_values()
                    .filter(|b| !b.applications.is_empty())
                    .collect();
                (!branches.is_empty()).then(|| CustomerNode {
                    customer_id,
                    customer_name: acc.name,
                    tat_days: acc.tat_days,
                    branches,
                })
            })
            .collect()
    }

    pub fn delay_tree(&self, classification: &Classification) -> Vec<CustomerNode<DelayedApplication>> {
        self.fold(&classification.cases, |c| match c.class {
            CaseClass::Overdue { days_out_of_tat, .. } => Some(DelayedApplication {
                case_id: c.case.case_id,
                name: c.case.applicant_name.clone(),
                is_priority: c.case.is_priority,
                created_at: c.case.created_at,
                days_out_of_tat,
                read: c.case.is_seen,
            }),
            _ => None,
        })
    }

    pub fn new_work_tree(&self, classification: &Classification) -> Vec<CustomerNode<NewApplication>> {
        self.fold(&classification.cases, |c| match c.class {
            CaseClass::Unactioned => Some(NewApplication {
                case_id: c.case.case_id,
                name: c.case.applicant_name.clone(),
                is_priority: c.case.is_priority,
                read: c.case.is_seen,
            }),
            _ => None,
        })
    }

    pub fn bulk_tree(&self, uploads: &[BulkUploadRecord]) -> Vec<CustomerNode<BulkUploadLeaf>> {
        self.fold(uploads, |u| {
            Some(BulkUploadLeaf {
                bulk_upload_id: u.bulk_upload_id,
                created_at: u.created_at,
                read: u.is_seen,
            })
        })
    }

    pub fn payload(
        &self,
        classification: &Classification,
        uploads: &[BulkUploadRecord],
    ) -> NotificationPayload {
        NotificationPayload {
            tat_delay_list: self.delay_tree(classification),
            new_applications: self.new_work_tree(classification),
            new_bulk_uploads: self.bulk_tree(uploads),
        }
    }
}

fn log_dropped(reason: TatError) {
    tracing::warn!(%reason, "dropping notification row");
}
