//! Category Service
//!
//! 分类树管理。slug 是创建时一次性计算的祖先全路径
//! （`electronics-phones-smartphones`），重命名父节点不会回写子孙。

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;
use shared::{AuthUser, ListResponse};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::RecordId;
use tracing::info;
use validator::Validate;

use crate::db::models::{Category, CategoryCreate, CategoryNode, CategoryUpdate};
use crate::query::{ListParams, QueryBuilder};
use crate::utils::{AppError, AppResult, slugify};

use super::{now_millis, parse_record};

/// Hard cap on the ancestor walk; a deeper chain is treated as corrupt
const MAX_DEPTH: usize = 32;

#[derive(Serialize)]
struct CategoryRow {
    name: String,
    slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<RecordId>,
    description: Option<String>,
    is_active: bool,
    created_by: RecordId,
    icon: Option<String>,
    created_at: i64,
    updated_at: i64,
}

#[derive(Serialize)]
struct CategoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
    updated_at: i64,
}

#[derive(Clone)]
pub struct CategoryService {
    db: Surreal<Db>,
}

impl CategoryService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// Create a category under an optional parent.
    ///
    /// Sibling names must be unique (Conflict otherwise). The slug is the
    /// dash-joined chain of every ancestor's own from-name slug plus this
    /// node's own, derived by an iterative parent walk.
    pub async fn create(
        &self,
        data: CategoryCreate,
        icon: Option<String>,
        auth: &AuthUser,
    ) -> AppResult<Category> {
        data.validate()?;
        let created_by = parse_record(&auth.user_id, "user")?;
        let parent = data
            .parent
            .as_deref()
            .map(|p| parse_record(p, "parent category"))
            .transpose()?;

        self.check_sibling_name(&data.name, parent.as_ref()).await?;
        let slug = self.build_full_slug(&data.name, parent.clone()).await?;

        let now = now_millis();
        let row = CategoryRow {
            name: data.name,
            slug,
            parent,
            description: data.description,
            is_active: true,
            created_by,
            icon,
            created_at: now,
            updated_at: now,
        };
        let created: Option<Category> = self.db.create("category").content(row).await?;
        let created =
            created.ok_or_else(|| AppError::Internal("Category was not created".to_string()))?;
        info!(target: "category", slug = %created.slug, "Category created");
        Ok(created)
    }

    /// Filtered category forest.
    ///
    /// The tree step is unpaginated: reconstruction needs the whole
    /// filtered set. A node whose parent was filtered out surfaces at the
    /// top level rather than disappearing.
    pub async fn get_all(&self, params: ListParams) -> AppResult<ListResponse<CategoryNode>> {
        let query = QueryBuilder::new("category", params)
            .search(&["name", "slug"])
            .filter()
            .is_active_filter()
            .sort()
            .fields();
        let rows: Vec<Category> = query.run(&self.db).await?;
        let meta = query.count_total(&self.db).await?;
        Ok(ListResponse {
            meta,
            result: build_tree(rows),
        })
    }

    /// Flat list of root categories
    pub async fn get_parents(&self) -> AppResult<Vec<Category>> {
        let mut result = self
            .db
            .query("SELECT * FROM category WHERE parent IS NONE ORDER BY name ASC")
            .await?;
        Ok(result.take(0)?)
    }

    /// Merge provided fields; the slug is left as created
    pub async fn update(
        &self,
        id: &str,
        data: CategoryUpdate,
        icon: Option<String>,
        auth: &AuthUser,
    ) -> AppResult<Category> {
        let thing = parse_record(id, "category")?;
        let existing: Option<Category> = self.db.select(thing.clone()).await?;
        let existing =
            existing.ok_or_else(|| AppError::NotFound(format!("Category not found: {id}")))?;
        check_owner(&existing, auth)?;

        let patch = CategoryPatch {
            name: data.name,
            description: data.description,
            is_active: data.is_active,
            icon,
            updated_at: now_millis(),
        };
        let mut result = self
            .db
            .query("UPDATE $thing MERGE $data RETURN AFTER")
            .bind(("thing", thing))
            .bind(("data", patch))
            .await?;
        let updated: Option<Category> = result.take(0)?;
        updated.ok_or_else(|| AppError::Internal("Category update returned no record".to_string()))
    }

    /// Delete a category and all transitive descendants.
    ///
    /// Refused with Conflict if any product still references the category
    /// as its top-level category. Traversal is a level-order walk, one
    /// query per depth level; the bulk delete runs afterwards as one call.
    /// Returns every deleted id.
    pub async fn delete(&self, id: &str, auth: &AuthUser) -> AppResult<Vec<String>> {
        let root = parse_record(id, "category")?;
        let existing: Option<Category> = self.db.select(root.clone()).await?;
        let existing =
            existing.ok_or_else(|| AppError::NotFound(format!("Category not found: {id}")))?;
        check_owner(&existing, auth)?;

        let referencing: Option<i64> = self
            .db
            .query("SELECT count() FROM product WHERE parent_category = $cat GROUP ALL")
            .bind(("cat", root.clone()))
            .await?
            .take((0, "count"))?;
        if referencing.unwrap_or(0) > 0 {
            return Err(AppError::Conflict(
                "Category is referenced by existing products".to_string(),
            ));
        }

        let mut all: Vec<RecordId> = vec![root.clone()];
        let mut seen: HashSet<String> = HashSet::from([root.to_string()]);
        let mut queue: VecDeque<RecordId> = VecDeque::from([root]);
        while !queue.is_empty() {
            let batch: Vec<RecordId> = queue.drain(..).collect();
            let children: Vec<RecordId> = self
                .db
                .query("SELECT VALUE id FROM category WHERE parent IN $batch")
                .bind(("batch", batch))
                .await?
                .take(0)?;
            for child in children {
                // seen guard keeps a corrupted cyclic chain from looping
                if seen.insert(child.to_string()) {
                    all.push(child.clone());
                    queue.push_back(child);
                }
            }
        }

        self.db
            .query("DELETE category WHERE id IN $ids")
            .bind(("ids", all.clone()))
            .await?;
        info!(target: "category", deleted = all.len(), "Category subtree deleted");
        Ok(all.into_iter().map(|id| id.to_string()).collect())
    }

    async fn check_sibling_name(&self, name: &str, parent: Option<&RecordId>) -> AppResult<()> {
        let count: Option<i64> = match parent {
            Some(parent) => {
                self.db
                    .query(
                        "SELECT count() FROM category \
                         WHERE name = $name AND parent = $parent GROUP ALL",
                    )
                    .bind(("name", name.to_string()))
                    .bind(("parent", parent.clone()))
                    .await?
                    .take((0, "count"))?
            }
            None => {
                self.db
                    .query(
                        "SELECT count() FROM category \
                         WHERE name = $name AND parent IS NONE GROUP ALL",
                    )
                    .bind(("name", name.to_string()))
                    .await?
                    .take((0, "count"))?
            }
        };
        if count.unwrap_or(0) > 0 {
            return Err(AppError::Conflict(format!(
                "A category named '{name}' already exists at this level"
            )));
        }
        Ok(())
    }

    /// Walk the parent chain to the root, collecting each ancestor's
    /// own from-name slug, then join root→leaf with dashes.
    async fn build_full_slug(&self, name: &str, parent: Option<RecordId>) -> AppResult<String> {
        let mut segments = vec![slugify(name)];
        let mut visited: HashSet<String> = HashSet::new();
        let mut cursor = parent;
        while let Some(id) = cursor {
            if !visited.insert(id.to_string()) || visited.len() > MAX_DEPTH {
                return Err(AppError::Internal(
                    "Category parent chain contains a cycle".to_string(),
                ));
            }
            let ancestor: Option<Category> = self.db.select(id.clone()).await?;
            let ancestor = ancestor
                .ok_or_else(|| AppError::NotFound(format!("Parent category not found: {id}")))?;
            segments.push(slugify(&ancestor.name));
            cursor = ancestor.parent;
        }
        segments.reverse();
        Ok(segments.join("-"))
    }
}

fn check_owner(category: &Category, auth: &AuthUser) -> AppResult<()> {
    let owner = category
        .created_by
        .as_ref()
        .map(RecordId::to_string)
        .unwrap_or_default();
    if auth.can_modify(&owner) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You can only modify your own categories".to_string(),
        ))
    }
}

/// Reassemble the fetched rows into a forest.
///
/// Index rows by id; attach a row under its parent only if the parent is
/// in the fetched set, otherwise it becomes top level. Rows unreachable
/// from any top-level node (a cyclic island) are dropped. No recursion.
fn build_tree(rows: Vec<Category>) -> Vec<CategoryNode> {
    let mut order: Vec<String> = Vec::with_capacity(rows.len());
    let mut nodes: HashMap<String, CategoryNode> = HashMap::with_capacity(rows.len());
    for row in rows {
        let Some(id) = row.id.as_ref().map(RecordId::to_string) else {
            continue;
        };
        order.push(id.clone());
        nodes.insert(id, CategoryNode::new(row));
    }

    let mut children: HashMap<String, Vec<String>> = HashMap::new();
    let mut roots: Vec<String> = Vec::new();
    for id in &order {
        let parent = nodes
            .get(id)
            .and_then(|n| n.category.parent.as_ref())
            .map(RecordId::to_string);
        match parent {
            Some(pid) if nodes.contains_key(&pid) => {
                children.entry(pid).or_default().push(id.clone());
            }
            _ => roots.push(id.clone()),
        }
    }

    // level-order from the top, then assemble bottom-up so every child
    // node is finished before its parent consumes it
    let mut level_order: Vec<String> = roots.clone();
    let mut i = 0;
    while i < level_order.len() {
        if let Some(kids) = children.get(&level_order[i]) {
            level_order.extend(kids.iter().cloned());
        }
        i += 1;
    }

    let mut built: HashMap<String, CategoryNode> = HashMap::with_capacity(level_order.len());
    for id in level_order.iter().rev() {
        let Some(mut node) = nodes.remove(id) else {
            continue;
        };
        if let Some(kids) = children.get(id) {
            for kid in kids {
                if let Some(child) = built.remove(kid) {
                    node.children.push(child);
                }
            }
        }
        built.insert(id.clone(), node);
    }

    roots
        .into_iter()
        .filter_map(|id| built.remove(&id))
        .collect()
}
