//! PostgreSQL node repository.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use papers_core::error::{AppError, ErrorKind};
use papers_core::result::AppResult;
use papers_core::traits::{Document, EntityStore};
use papers_core::types::{NodeId, Query, UserId};
use papers_entity::node::{FileAttrs, FolderAttrs, Node, NodeKind, NodePatch, ParentId, Tag};

use crate::query::{ColumnType, push_where};

const COLUMNS: &str = "id, name, parent_id, creator, status, is_folder, uri, size, \
                       objects, last_index, tag, date_created, date_modified";

/// Row shape of the `nodes` table.
#[derive(Debug, FromRow)]
struct NodeRow {
    id: Uuid,
    name: String,
    parent_id: String,
    creator: Uuid,
    status: bool,
    is_folder: bool,
    uri: Option<String>,
    size: Option<i64>,
    objects: Option<Vec<Uuid>>,
    last_index: Option<i64>,
    tag: Option<String>,
    date_created: DateTime<Utc>,
    date_modified: DateTime<Utc>,
}

impl TryFrom<NodeRow> for Node {
    type Error = AppError;

    fn try_from(row: NodeRow) -> Result<Self, Self::Error> {
        let parent_id: ParentId = row.parent_id.parse().map_err(|e| {
            AppError::with_source(
                ErrorKind::Store,
                format!("Node {} has a malformed parent_id '{}'", row.id, row.parent_id),
                e,
            )
        })?;

        let kind = if row.is_folder {
            NodeKind::Folder(FolderAttrs {
                objects: row
                    .objects
                    .unwrap_or_default()
                    .into_iter()
                    .map(NodeId::from_uuid)
                    .collect(),
                last_index: row.last_index.unwrap_or(0).max(0) as u64,
                tag: Tag::from(row.tag.unwrap_or_default()),
            })
        } else {
            NodeKind::File(FileAttrs {
                uri: row.uri.unwrap_or_default(),
                size: row.size.unwrap_or(0).max(0) as u64,
            })
        };

        Ok(Node {
            id: NodeId::from_uuid(row.id),
            name: row.name,
            parent_id,
            creator: UserId::from_uuid(row.creator),
            status: row.status,
            date_created: row.date_created,
            date_modified: row.date_modified,
            kind,
        })
    }
}

fn node_column(field: &str) -> Option<(&'static str, ColumnType)> {
    match field {
        "id" => Some(("id", ColumnType::Uuid)),
        "name" => Some(("name", ColumnType::Text)),
        "parent_id" => Some(("parent_id", ColumnType::Text)),
        "creator" => Some(("creator", ColumnType::Uuid)),
        "status" => Some(("status", ColumnType::Bool)),
        "is_folder" => Some(("is_folder", ColumnType::Bool)),
        "tag" => Some(("tag", ColumnType::Text)),
        "uri" => Some(("uri", ColumnType::Text)),
        "last_index" => Some(("last_index", ColumnType::BigInt)),
        _ => None,
    }
}

fn store_err(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Store, message, e)
}

fn object_ids(objects: &[NodeId]) -> Vec<Uuid> {
    objects.iter().map(|id| id.into_uuid()).collect()
}

/// Node persistence in the `nodes` table.
#[derive(Debug, Clone)]
pub struct PgNodeStore {
    pool: PgPool,
}

impl PgNodeStore {
    /// Create a new node repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, builder: &mut QueryBuilder<'_, Postgres>) -> AppResult<Vec<Node>> {
        let rows = builder
            .build_query_as::<NodeRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(store_err("Failed to query nodes"))?;
        rows.into_iter().map(Node::try_from).collect()
    }

    /// Write every mutable column of `node` back to its row.
    async fn write_back<'e, E>(executor: E, node: &Node) -> AppResult<()>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let folder = node.as_folder();
        sqlx::query(
            "UPDATE nodes SET name = $2, parent_id = $3, status = $4, objects = $5, \
             last_index = $6, tag = $7, date_modified = $8 WHERE id = $1",
        )
        .bind(node.id)
        .bind(&node.name)
        .bind(node.parent_id.to_string())
        .bind(node.status)
        .bind(folder.map(|f| object_ids(&f.objects)))
        .bind(folder.map(|f| f.last_index as i64))
        .bind(folder.map(|f| f.tag.as_str().to_string()))
        .bind(node.date_modified)
        .execute(executor)
        .await
        .map_err(store_err("Failed to update node"))?;
        Ok(())
    }
}

#[async_trait]
impl EntityStore<Node> for PgNodeStore {
    async fn get(&self, id: Uuid) -> AppResult<Option<Node>> {
        let row = sqlx::query_as::<_, NodeRow>(&format!("SELECT {COLUMNS} FROM nodes WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err("Failed to find node"))?;
        row.map(Node::try_from).transpose()
    }

    async fn get_many(&self, ids: &[Uuid]) -> AppResult<Vec<Node>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows =
            sqlx::query_as::<_, NodeRow>(&format!("SELECT {COLUMNS} FROM nodes WHERE id = ANY($1)"))
                .bind(ids.to_vec())
                .fetch_all(&self.pool)
                .await
                .map_err(store_err("Failed to fetch nodes"))?;

        let mut by_id: HashMap<Uuid, Node> = HashMap::with_capacity(rows.len());
        for row in rows {
            let node = Node::try_from(row)?;
            by_id.insert(node.id.into_uuid(), node);
        }
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn filter(&self, query: &Query) -> AppResult<Vec<Node>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM nodes"));
        push_where(&mut builder, query, node_column)?;
        builder.push(" ORDER BY date_created ASC, id ASC");
        self.fetch(&mut builder).await
    }

    async fn insert(&self, mut node: Node) -> AppResult<Node> {
        node.assign_id(Uuid::now_v7());
        let folder = node.as_folder();
        let file = node.as_file();
        sqlx::query(
            "INSERT INTO nodes (id, name, parent_id, creator, status, is_folder, uri, size, \
             objects, last_index, tag, date_created, date_modified) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(node.id)
        .bind(&node.name)
        .bind(node.parent_id.to_string())
        .bind(node.creator)
        .bind(node.status)
        .bind(node.is_folder())
        .bind(file.map(|f| f.uri.clone()))
        .bind(file.map(|f| f.size as i64))
        .bind(folder.map(|f| object_ids(&f.objects)))
        .bind(folder.map(|f| f.last_index as i64))
        .bind(folder.map(|f| f.tag.as_str().to_string()))
        .bind(node.date_created)
        .bind(node.date_modified)
        .execute(&self.pool)
        .await
        .map_err(store_err("Failed to insert node"))?;
        Ok(node)
    }

    async fn update(&self, id: Uuid, patch: &NodePatch) -> AppResult<Option<Node>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(store_err("Failed to begin transaction"))?;

        let row = sqlx::query_as::<_, NodeRow>(&format!(
            "SELECT {COLUMNS} FROM nodes WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_err("Failed to lock node"))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut node = Node::try_from(row)?;
        node.apply(patch);
        Self::write_back(&mut *tx, &node).await?;

        tx.commit()
            .await
            .map_err(store_err("Failed to commit node update"))?;
        Ok(Some(node))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM nodes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err("Failed to delete node"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_where(&self, query: &Query, patch: &NodePatch) -> AppResult<u64> {
        if patch.is_empty() {
            return Ok(0);
        }
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE nodes SET ");
        {
            let mut set = builder.separated(", ");
            if let Some(name) = &patch.name {
                set.push("name = ").push_bind_unseparated(name.clone());
            }
            if let Some(parent) = patch.parent_id {
                set.push("parent_id = ").push_bind_unseparated(parent.to_string());
            }
            if let Some(status) = patch.status {
                set.push("status = ").push_bind_unseparated(status);
            }
            if let Some(modified) = patch.date_modified {
                set.push("date_modified = ").push_bind_unseparated(modified);
            }
            // Folder-only columns stay untouched on file rows.
            if let Some(objects) = &patch.objects {
                set.push("objects = CASE WHEN is_folder THEN ")
                    .push_bind_unseparated(object_ids(objects))
                    .push_unseparated(" ELSE objects END");
            }
            if let Some(last_index) = patch.last_index {
                set.push("last_index = CASE WHEN is_folder THEN ")
                    .push_bind_unseparated(last_index as i64)
                    .push_unseparated(" ELSE last_index END");
            }
            if let Some(tag) = &patch.tag {
                set.push("tag = CASE WHEN is_folder THEN ")
                    .push_bind_unseparated(tag.as_str().to_string())
                    .push_unseparated(" ELSE tag END");
            }
        }
        push_where(&mut builder, query, node_column)?;

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(store_err("Failed to update nodes"))?;
        Ok(result.rows_affected())
    }

    async fn delete_where(&self, query: &Query) -> AppResult<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("DELETE FROM nodes");
        push_where(&mut builder, query, node_column)?;
        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(store_err("Failed to delete nodes"))?;
        Ok(result.rows_affected())
    }
}
