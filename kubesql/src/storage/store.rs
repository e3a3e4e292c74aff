// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! SQLite-backed store and its transactional writer

use super::error::{StorageError, StorageResult};
use crate::resource::{
    NodeRecord, PodRecord, ReplicationControllerRecord, Resource, ServiceRecord,
};
use crate::schema::{ResourceKind, Table};
use rusqlite::{params, Connection, Transaction};
use std::collections::{BTreeMap, HashSet};

/// In-memory relational store with the schema created exactly once
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open a fresh in-memory database and create every table
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.create_tables()?;
        Ok(store)
    }

    fn create_tables(&self) -> StorageResult<()> {
        for table in Table::ALL {
            self.conn
                .execute(table.create_statement(), [])
                .map_err(|e| StorageError::Schema {
                    table: table.name(),
                    reason: e.to_string(),
                })?;
        }
        log::debug!("Created {} tables", Table::ALL.len());
        Ok(())
    }

    /// Raw connection for query execution
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begin a write transaction; dropping the writer without commit rolls back
    pub fn writer(&mut self) -> StorageResult<StoreWriter<'_>> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| StorageError::Transaction(e.to_string()))?;
        Ok(StoreWriter { tx })
    }

    pub fn count_rows(&self, table: Table) -> StorageResult<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Upsert and prune operations applied inside one transaction
pub struct StoreWriter<'a> {
    tx: Transaction<'a>,
}

impl<'a> StoreWriter<'a> {
    pub fn upsert_node(&self, node: &NodeRecord) -> StorageResult<()> {
        self.tx
            .prepare_cached(&Table::Nodes.upsert_statement())?
            .execute(params![node.metadata.uid, node.metadata.name, node.ip])?;
        self.replace_metadata(node)
    }

    /// Upsert the pod row and rebuild its container rows
    pub fn upsert_pod(&self, pod: &PodRecord, namespace: &str) -> StorageResult<()> {
        let uid = &pod.metadata.uid;
        self.tx
            .prepare_cached(&Table::Pods.upsert_statement())?
            .execute(params![uid, pod.metadata.name, namespace, pod.host])?;

        self.tx
            .prepare_cached("DELETE FROM containers WHERE pod_uid = ?1")?
            .execute(params![uid])?;
        let mut insert = self.tx.prepare_cached(&Table::Containers.upsert_statement())?;
        for container in &pod.containers {
            insert.execute(params![container.name, container.image, uid, container.restarts])?;
        }

        self.replace_metadata(pod)
    }

    pub fn upsert_service(&self, service: &ServiceRecord, namespace: &str) -> StorageResult<()> {
        self.tx
            .prepare_cached(&Table::Services.upsert_statement())?
            .execute(params![
                service.metadata.uid,
                service.metadata.name,
                namespace,
                service.cluster_ip
            ])?;
        self.replace_metadata(service)
    }

    pub fn upsert_replication_controller(
        &self,
        rc: &ReplicationControllerRecord,
        namespace: &str,
    ) -> StorageResult<()> {
        self.tx
            .prepare_cached(&Table::ReplicationControllers.upsert_statement())?
            .execute(params![rc.metadata.uid, rc.metadata.name, namespace, rc.replicas])?;
        self.replace_metadata(rc)
    }

    /// Replace the owner's label and annotation sets with the snapshot's
    fn replace_metadata<R: Resource>(&self, resource: &R) -> StorageResult<()> {
        let meta = resource.metadata();
        self.replace_pairs(Table::Labels, R::KIND, &meta.uid, &meta.labels)?;
        self.replace_pairs(Table::Annotations, R::KIND, &meta.uid, &meta.annotations)
    }

    fn replace_pairs(
        &self,
        table: Table,
        kind: ResourceKind,
        uid: &str,
        pairs: &BTreeMap<String, String>,
    ) -> StorageResult<()> {
        self.tx
            .prepare_cached(&format!(
                "DELETE FROM {} WHERE kind = ?1 AND uid = ?2",
                table.name()
            ))?
            .execute(params![kind.as_str(), uid])?;

        let mut insert = self.tx.prepare_cached(&table.upsert_statement())?;
        for (key, value) in pairs {
            insert.execute(params![key, value, kind.as_str(), uid])?;
        }
        Ok(())
    }

    /// Delete rows of `kind` (within `namespace`, if given) whose uid is not in `keep`
    pub fn prune(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        keep: &HashSet<String>,
    ) -> StorageResult<usize> {
        let table = kind.table().name();
        let stale: Vec<String> = match namespace {
            Some(ns) => {
                let mut stmt = self
                    .tx
                    .prepare_cached(&format!("SELECT uid FROM {} WHERE namespace = ?1", table))?;
                let uids = stmt
                    .query_map(params![ns], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                uids
            }
            None => {
                let mut stmt = self.tx.prepare_cached(&format!("SELECT uid FROM {}", table))?;
                let uids = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                uids
            }
        }
        .into_iter()
        .filter(|uid| !keep.contains(uid))
        .collect();

        for uid in &stale {
            self.delete_resource(kind, uid)?;
        }
        Ok(stale.len())
    }

    /// Delete namespaced rows whose namespace no longer exists
    pub fn prune_namespaces(&self, keep: &HashSet<String>) -> StorageResult<usize> {
        let mut pruned = 0;
        for kind in ResourceKind::ALL.into_iter().filter(|k| k.is_namespaced()) {
            let mut stmt = self.tx.prepare_cached(&format!(
                "SELECT uid, namespace FROM {}",
                kind.table().name()
            ))?;
            let stale: Vec<String> = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .filter(|(_, ns)| ns.as_ref().map_or(true, |ns| !keep.contains(ns)))
                .map(|(uid, _)| uid)
                .collect();

            for uid in &stale {
                self.delete_resource(kind, uid)?;
            }
            pruned += stale.len();
        }
        Ok(pruned)
    }

    /// Remove a resource row together with everything it owns
    fn delete_resource(&self, kind: ResourceKind, uid: &str) -> StorageResult<()> {
        self.tx
            .prepare_cached(&format!("DELETE FROM {} WHERE uid = ?1", kind.table().name()))?
            .execute(params![uid])?;
        for table in [Table::Labels, Table::Annotations] {
            self.tx
                .prepare_cached(&format!(
                    "DELETE FROM {} WHERE kind = ?1 AND uid = ?2",
                    table.name()
                ))?
                .execute(params![kind.as_str(), uid])?;
        }
        if kind == ResourceKind::Pod {
            self.tx
                .prepare_cached("DELETE FROM containers WHERE pod_uid = ?1")?
                .execute(params![uid])?;
        }
        log::debug!("Pruned {} {}", kind, uid);
        Ok(())
    }

    pub fn commit(self) -> StorageResult<()> {
        self.tx
            .commit()
            .map_err(|e| StorageError::Transaction(e.to_string()))
    }

    pub fn rollback(self) -> StorageResult<()> {
        self.tx
            .rollback()
            .map_err(|e| StorageError::Transaction(e.to_string()))
    }
}
