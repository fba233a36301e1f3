//! Line-item planning for order creation and update.
//!
//! The functions here are pure: they take the incoming lines, the order's current line items and an
//! [`ArticleLookup`], and produce a [`LinePlan`] describing exactly which rows to insert, change and delete, along
//! with a [`LineResult`] for every incoming line. Backends apply the plan inside a transaction and then recompute the
//! order totals with [`compute_totals`].
use std::collections::{HashMap, HashSet};

use log::*;
use ods_common::Money;

use crate::{
    db_types::{Article, LineItem},
    ode_api::order_objects::{LineItemUpdate, LineRejection, LineResult, NewLineItem, OrderLine},
};

/// Catalog articles indexed by reference.
#[derive(Debug, Clone, Default)]
pub struct ArticleLookup {
    by_reference: HashMap<String, Vec<Article>>,
}

impl ArticleLookup {
    pub fn new<I: IntoIterator<Item = Article>>(articles: I) -> Self {
        let mut by_reference: HashMap<String, Vec<Article>> = HashMap::new();
        for article in articles {
            by_reference.entry(article.reference.clone()).or_default().push(article);
        }
        Self { by_reference }
    }

    /// Resolves a reference to exactly one article.
    pub fn resolve(&self, reference: &str) -> Result<&Article, LineRejection> {
        match self.by_reference.get(reference).map(Vec::as_slice) {
            None | Some([]) => Err(LineRejection::UnknownReference),
            Some([article]) => Ok(article),
            Some(_) => Err(LineRejection::AmbiguousReference),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_reference.is_empty()
    }
}

/// A line item to be created. `position` is the index of the incoming line it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedLine {
    pub position: usize,
    pub article_id: i64,
    pub amount: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinePlan {
    /// `(line item id, new amount)`
    pub amount_updates: Vec<(i64, u32)>,
    /// Ids of line items to delete
    pub deletions: Vec<i64>,
    pub insertions: Vec<PlannedLine>,
    /// One entry per incoming line, in request order
    pub results: Vec<LineResult>,
}

impl LinePlan {
    /// Records the id assigned to a newly inserted line in its `LineResult`.
    pub fn record_insert(&mut self, position: usize, line_item_id: i64) {
        if let Some(result) = self.results.iter_mut().find(|r| r.position == position) {
            result.line_item_id = Some(line_item_id);
        }
    }

    pub fn rejected_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_accepted()).count()
    }
}

fn plan_new_line(position: usize, reference: &str, amount: u32, lookup: &ArticleLookup, plan: &mut LinePlan) {
    match lookup.resolve(reference) {
        Ok(article) => {
            plan.insertions.push(PlannedLine { position, article_id: article.id, amount });
            plan.results.push(LineResult::accepted(position, Some(reference.to_string()), None));
        },
        Err(reason) => {
            info!("📦️ Skipping line {position}: reference '{reference}' was rejected ({reason:?})");
            plan.results.push(LineResult::rejected(position, Some(reference.to_string()), None, reason));
        },
    }
}

/// Plans the line items of a brand-new order.
pub fn plan_creation(lines: &[NewLineItem], lookup: &ArticleLookup) -> LinePlan {
    let mut plan = LinePlan::default();
    for (position, line) in lines.iter().enumerate() {
        plan_new_line(position, &line.reference, line.amount, lookup, &mut plan);
    }
    plan
}

/// Reconciles the existing line items of an order with an incoming set.
///
/// * Incoming lines with an id change the amount of the existing line item with that id. An id that is not one of
///   the order's line items is rejected. If an id appears more than once, the last entry wins.
/// * Incoming lines without an id are resolved by reference and inserted.
/// * Existing line items that no accepted incoming line refers to are deleted.
pub fn plan_update(existing: &[LineItem], incoming: &[LineItemUpdate], lookup: &ArticleLookup) -> LinePlan {
    let existing_ids = existing.iter().map(|l| l.id).collect::<HashSet<i64>>();
    let last_position = incoming
        .iter()
        .enumerate()
        .filter_map(|(pos, line)| line.id.map(|id| (id, pos)))
        .collect::<HashMap<i64, usize>>();
    let mut plan = LinePlan::default();
    let mut retained = HashSet::new();
    for (position, line) in incoming.iter().enumerate() {
        match (line.id, line.reference.as_deref()) {
            (Some(id), _) => {
                let reference = line.reference.clone();
                if !existing_ids.contains(&id) {
                    info!("📦️ Skipping line {position}: line item {id} does not belong to this order");
                    plan.results.push(LineResult::rejected(position, reference, Some(id), LineRejection::UnknownLineItem));
                } else if last_position.get(&id) != Some(&position) {
                    debug!("📦️ Line {position} is superseded by a later entry for line item {id}");
                    plan.results.push(LineResult::rejected(
                        position,
                        reference,
                        Some(id),
                        LineRejection::DuplicateLineItem,
                    ));
                } else {
                    retained.insert(id);
                    plan.amount_updates.push((id, line.amount));
                    plan.results.push(LineResult::accepted(position, reference, Some(id)));
                }
            },
            (None, Some(reference)) => plan_new_line(position, reference, line.amount, lookup, &mut plan),
            (None, None) => {
                info!("📦️ Skipping line {position}: it has neither an id nor a reference");
                plan.results.push(LineResult::rejected(position, None, None, LineRejection::MissingReference));
            },
        }
    }
    plan.deletions = existing.iter().map(|l| l.id).filter(|id| !retained.contains(id)).collect();
    plan
}

/// Computes `(price, tax_price)` over a full set of order lines, rounded to cents.
pub fn compute_totals(lines: &[OrderLine]) -> (Money, Money) {
    let (price, tax_price) = lines.iter().fold((Money::default(), Money::default()), |(price, tax), line| {
        let article = &line.article;
        (price + article.price * line.amount, tax + article.price_with_tax() * line.amount)
    });
    (price.rounded(), tax_price.rounded())
}
