use std::collections::HashMap;

use crate::error::{RepositoryError, Result};
use crate::record::{Field, FieldType, FieldValue, Fields, Pk, Record, PK_FIELD, UNSAVED_PK};
use crate::repository::{Filter, Repository};

/// Expense category. Categories form a tree through `parent`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub parent: Option<Pk>,
    pub pk: Pk,
}

impl Category {
    pub fn new(name: impl Into<String>, parent: Option<Pk>) -> Self {
        Self {
            name: name.into(),
            parent,
            pk: UNSAVED_PK,
        }
    }

    pub fn get_parent<R: Repository<Category>>(&self, repo: &R) -> Result<Option<Category>> {
        match self.parent {
            Some(pk) => repo.get(pk),
            None => Ok(None),
        }
    }

    /// Ancestors from the direct parent up to the root.
    pub fn get_all_parents<R: Repository<Category>>(&self, repo: &R) -> Result<Vec<Category>> {
        let mut parents = Vec::new();
        let mut current = self.get_parent(repo)?;
        while let Some(category) = current {
            if parents.iter().any(|p: &Category| p.pk == category.pk) {
                return Err(RepositoryError::InvalidArgument(format!(
                    "category {} is its own ancestor",
                    category.pk
                )));
            }
            current = category.get_parent(repo)?;
            parents.push(category);
        }
        Ok(parents)
    }

    /// Descendants in breadth-first order.
    pub fn get_subcategories<R: Repository<Category>>(&self, repo: &R) -> Result<Vec<Category>> {
        let mut out: Vec<Category> = Vec::new();
        let mut frontier = vec![self.pk];
        while let Some(pk) = frontier.pop() {
            for child in repo.get_all(Some(&Filter::new().eq("parent", pk)))? {
                if child.pk == self.pk || out.iter().any(|c| c.pk == child.pk) {
                    continue;
                }
                frontier.insert(0, child.pk);
                out.push(child);
            }
        }
        Ok(out)
    }

    /// Adds a tree given as `(name, parent name)` pairs, parents listed
    /// before their children. Returns the stored categories in input order.
    pub fn create_from_tree<R: Repository<Category>>(
        tree: &[(&str, Option<&str>)],
        repo: &R,
    ) -> Result<Vec<Category>> {
        let mut by_name: HashMap<&str, Pk> = HashMap::new();
        let mut created = Vec::with_capacity(tree.len());
        for (name, parent) in tree {
            let parent_pk = match parent {
                Some(parent) => Some(*by_name.get(parent).ok_or_else(|| {
                    RepositoryError::InvalidArgument(format!(
                        "parent `{parent}` of `{name}` is not listed before it"
                    ))
                })?),
                None => None,
            };
            let mut category = Category::new(*name, parent_pk);
            by_name.insert(*name, repo.add(&mut category)?);
            created.push(category);
        }
        Ok(created)
    }
}

impl Record for Category {
    const TYPE_NAME: &'static str = "Category";
    const FIELDS: &'static [Field] = &[
        Field::new("name", FieldType::Text),
        Field::new("parent", FieldType::Optional(&FieldType::Integer)).references("category"),
        Field::new(PK_FIELD, FieldType::Integer),
    ];

    fn pk(&self) -> Pk {
        self.pk
    }

    fn set_pk(&mut self, pk: Pk) {
        self.pk = pk;
    }

    fn field_value(&self, name: &str) -> Option<FieldValue> {
        match name {
            "name" => Some(self.name.clone().into()),
            "parent" => Some(self.parent.into()),
            _ => None,
        }
    }

    fn from_fields(mut fields: Fields) -> Result<Self> {
        Ok(Self {
            name: fields.take("name")?,
            parent: fields.take("parent")?,
            pk: UNSAVED_PK,
        })
    }
}
