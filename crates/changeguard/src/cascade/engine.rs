//! Trigger validation and repair.

use tracing::{debug, info};

use crate::core::schema::{CascadeRule, DeletedObjects, Snapshot, TriggerHeader, TriggerInfo};
use crate::core::statement::Statement;
use crate::core::traits::Introspector;
use crate::error::{ChangeError, Result};

use super::convention::TriggerConvention;

/// A trigger that must be dropped and regenerated with fewer rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerRepair {
    /// Name of the existing trigger.
    pub trigger_name: String,

    /// Table the trigger is defined on.
    pub table: String,

    /// Single primary key column of `table`.
    pub pk_column: String,

    /// Rules still valid, in extraction order.
    pub surviving: Vec<CascadeRule>,

    /// Rules removed by the repair.
    pub dropped: Vec<CascadeRule>,
}

impl TriggerRepair {
    /// The drop and create statements, in execution order.
    pub fn statements(&self) -> [Statement; 2] {
        let (drop, create) = build_repair(
            &self.trigger_name,
            &self.table,
            &self.pk_column,
            &self.surviving,
        );
        [drop, create]
    }
}

/// Build the statement pair replacing a trigger.
pub fn build_repair(
    trigger_name: &str,
    table: &str,
    pk_column: &str,
    surviving: &[CascadeRule],
) -> (Statement, Statement) {
    (
        Statement::DropTrigger {
            name: trigger_name.to_string(),
        },
        Statement::CreateCascadeTrigger {
            table: table.to_string(),
            pk_column: pk_column.to_string(),
            rules: surviving.to_vec(),
        },
    )
}

/// Keeps cascade-delete triggers consistent when tables, columns or foreign
/// keys disappear.
///
/// Every entry point is all-or-nothing: an introspection failure aborts the
/// computation before any statement is returned.
#[derive(Debug, Clone)]
pub struct TriggerEngine {
    convention: TriggerConvention,
}

impl TriggerEngine {
    pub fn new(convention: TriggerConvention) -> Self {
        Self { convention }
    }

    pub fn convention(&self) -> &TriggerConvention {
        &self.convention
    }

    /// Every trigger on a cascade-managed table, with its source text.
    ///
    /// No managed triggers is a normal state and yields an empty list.
    pub async fn find_relevant_triggers(
        &self,
        introspector: &dyn Introspector,
    ) -> Result<Vec<TriggerInfo>> {
        let mut headers: Vec<TriggerHeader> = introspector
            .list_triggers()
            .await?
            .into_iter()
            .filter(|h| self.convention.is_managed_table(&h.table))
            .collect();
        headers.sort_by_key(|h| h.name.to_lowercase());

        let mut triggers = Vec::with_capacity(headers.len());
        for header in headers {
            triggers.push(fetch_trigger(introspector, header).await?);
        }

        debug!("Found {} cascade-managed triggers", triggers.len());
        Ok(triggers)
    }

    /// The delete trigger defined on a table, if any.
    pub async fn delete_trigger_for_table(
        &self,
        introspector: &dyn Introspector,
        table: &str,
    ) -> Result<Option<TriggerInfo>> {
        let header = introspector
            .list_triggers()
            .await?
            .into_iter()
            .find(|h| h.table.eq_ignore_ascii_case(table));

        match header {
            Some(header) => Ok(Some(fetch_trigger(introspector, header).await?)),
            None => Ok(None),
        }
    }

    /// Extract the cascade rules declared in a trigger body.
    pub fn extract_cascade_rules(&self, body: &str) -> Vec<CascadeRule> {
        self.convention.extract_cascade_rules(body)
    }

    /// Check every rule of a trigger against the snapshot.
    ///
    /// A rule survives iff its table and column exist and are not being
    /// deleted, and a surviving foreign key links that column to the
    /// trigger table's primary key. Returns `None` when every rule survives.
    ///
    /// # Errors
    ///
    /// `Introspection` if the trigger table is missing from the snapshot or
    /// lacks a single-column primary key.
    pub fn validate_trigger(
        &self,
        trigger: &TriggerInfo,
        snapshot: &Snapshot,
        deleted: &DeletedObjects,
    ) -> Result<Option<TriggerRepair>> {
        let pk_column = resolve_pk_column(snapshot, &trigger.table)?;
        let rules = self.extract_cascade_rules(&trigger.body);

        let (surviving, dropped): (Vec<CascadeRule>, Vec<CascadeRule>) = rules
            .into_iter()
            .partition(|rule| rule_survives(rule, &trigger.table, &pk_column, snapshot, deleted));

        if dropped.is_empty() {
            return Ok(None);
        }

        Ok(Some(TriggerRepair {
            trigger_name: trigger.name.clone(),
            table: trigger.table.clone(),
            pk_column,
            surviving,
            dropped,
        }))
    }

    /// Like [`validate_trigger`](Self::validate_trigger), for a change that
    /// follows earlier changes in the same changeset.
    ///
    /// `prior` holds what the earlier changes delete. Their repairs already
    /// replaced the live trigger with the regenerated one, so a repair here
    /// drops that regenerated trigger and removes only the rules `deleted`
    /// newly invalidates. Rules invalidated by `prior` never come back.
    pub fn validate_trigger_after(
        &self,
        trigger: &TriggerInfo,
        snapshot: &Snapshot,
        prior: &DeletedObjects,
        deleted: &DeletedObjects,
    ) -> Result<Option<TriggerRepair>> {
        if prior.is_empty() {
            return self.validate_trigger(trigger, snapshot, deleted);
        }

        let Some(mut after) = self.validate_trigger(trigger, snapshot, &prior.union(deleted))?
        else {
            return Ok(None);
        };
        let Some(before) = self.validate_trigger(trigger, snapshot, prior)? else {
            return Ok(Some(after));
        };

        after.dropped = before
            .surviving
            .into_iter()
            .filter(|rule| !after.surviving.iter().any(|kept| kept.same_as(rule)))
            .collect();
        if after.dropped.is_empty() {
            return Ok(None);
        }
        after.trigger_name = self.convention.trigger_name_for(&trigger.table);
        Ok(Some(after))
    }

    /// Repairs for every managed trigger, flattened into statements.
    ///
    /// Triggers whose table is itself being deleted are skipped. Trigger text
    /// is fetched once per snapshot and table prefix and cached on the
    /// snapshot.
    pub async fn validate_all_triggers(
        &self,
        introspector: &dyn Introspector,
        snapshot: &Snapshot,
        deleted: &DeletedObjects,
    ) -> Result<Vec<Statement>> {
        self.validate_all_triggers_after(introspector, snapshot, &DeletedObjects::new(), deleted)
            .await
    }

    /// Repairs for every managed trigger when earlier changes in the same
    /// changeset already delete `prior`.
    pub async fn validate_all_triggers_after(
        &self,
        introspector: &dyn Introspector,
        snapshot: &Snapshot,
        prior: &DeletedObjects,
        deleted: &DeletedObjects,
    ) -> Result<Vec<Statement>> {
        let triggers = snapshot
            .cached_triggers(self.convention.table_prefix(), || {
                self.find_relevant_triggers(introspector)
            })
            .await?;

        let gone = prior.union(deleted);
        let mut repairs = Vec::new();
        for trigger in triggers.iter() {
            if gone.contains_trigger(&trigger.name, &trigger.table) {
                debug!("Skipping trigger {} on a deleted table", trigger.name);
                continue;
            }
            if let Some(repair) = self.validate_trigger_after(trigger, snapshot, prior, deleted)? {
                repairs.push(repair);
            }
        }

        Ok(self.repair_statements(repairs))
    }

    /// Flatten repairs into drop/create pairs, logging each one.
    pub fn repair_statements(&self, repairs: Vec<TriggerRepair>) -> Vec<Statement> {
        let mut statements = Vec::with_capacity(repairs.len() * 2);
        for repair in repairs {
            info!(
                "Repairing trigger {} on {}: dropping {} rule(s), keeping {}",
                repair.trigger_name,
                repair.table,
                repair.dropped.len(),
                repair.surviving.len()
            );
            statements.extend(repair.statements());
        }
        statements
    }
}

async fn fetch_trigger(introspector: &dyn Introspector, header: TriggerHeader) -> Result<TriggerInfo> {
    let lines = introspector.trigger_text_lines(&header.name).await?;
    if lines.is_empty() {
        return Err(ChangeError::introspection(format!(
            "no source text for trigger {} on {}",
            header.name, header.table
        )));
    }

    Ok(TriggerInfo {
        name: header.name,
        table: header.table,
        body: lines.concat(),
    })
}

fn resolve_pk_column(snapshot: &Snapshot, table: &str) -> Result<String> {
    let pk = snapshot.primary_key_for_table(table).ok_or_else(|| {
        ChangeError::introspection(format!("cannot resolve primary key of {}", table))
    })?;

    match pk.columns.as_slice() {
        [column] => Ok(column.clone()),
        columns => Err(ChangeError::introspection(format!(
            "primary key of {} has {} columns; cascade triggers need exactly one",
            table,
            columns.len()
        ))),
    }
}

fn rule_survives(
    rule: &CascadeRule,
    trigger_table: &str,
    pk_column: &str,
    snapshot: &Snapshot,
    deleted: &DeletedObjects,
) -> bool {
    let Some(table) = snapshot.table(&rule.table) else {
        return false;
    };
    if deleted.contains_table(&table.name) {
        return false;
    }

    let Some(column) = table.column(&rule.column) else {
        return false;
    };
    if deleted.contains_column(&table.name, &column.name) {
        return false;
    }

    snapshot.foreign_keys().iter().any(|fk| {
        fk.links(&table.name, &column.name, trigger_table, pk_column)
            && !deleted.contains_foreign_key(fk)
    })
}
