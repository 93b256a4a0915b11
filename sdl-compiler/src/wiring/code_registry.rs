use std::fmt;
use std::sync::Arc;

use apollo_compiler::Name;
use indexmap::IndexMap;
use serde_json::Value;

use super::BoxError;
use super::DataFetcher;
use super::DataFetchingEnvironment;
use super::TypeResolver;

/// `Type.field`, the key under which a field's data fetcher is registered.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct FieldCoordinate {
    pub type_name: Name,
    pub field_name: Name,
}

impl FieldCoordinate {
    pub fn new(type_name: Name, field_name: Name) -> Self {
        Self {
            type_name,
            field_name,
        }
    }
}

impl fmt::Display for FieldCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.field_name)
    }
}

/// Reads the property named like the field from the source object.
#[derive(Clone, Copy, Debug, Default)]
pub struct PropertyDataFetcher;

impl DataFetcher for PropertyDataFetcher {
    fn fetch(&self, environment: &DataFetchingEnvironment<'_>) -> Result<Value, BoxError> {
        Ok(environment
            .source
            .get(environment.field_name.as_str())
            .cloned()
            .unwrap_or(Value::Null))
    }
}

/// Data fetchers and type resolvers of a built schema.
#[derive(Clone)]
pub struct CodeRegistry {
    data_fetchers: IndexMap<FieldCoordinate, Arc<dyn DataFetcher>>,
    type_resolvers: IndexMap<Name, Arc<dyn TypeResolver>>,
    default_data_fetcher: Arc<dyn DataFetcher>,
}

impl CodeRegistry {
    pub fn builder() -> CodeRegistryBuilder {
        CodeRegistryBuilder::default()
    }

    /// The fetcher registered for a field, or the default one.
    pub fn data_fetcher(&self, type_name: &Name, field_name: &Name) -> &Arc<dyn DataFetcher> {
        self.data_fetchers
            .get(&FieldCoordinate::new(type_name.clone(), field_name.clone()))
            .unwrap_or(&self.default_data_fetcher)
    }

    pub fn has_data_fetcher(&self, type_name: &Name, field_name: &Name) -> bool {
        self.data_fetchers
            .contains_key(&FieldCoordinate::new(type_name.clone(), field_name.clone()))
    }

    pub fn type_resolver(&self, type_name: &str) -> Option<&Arc<dyn TypeResolver>> {
        self.type_resolvers.get(type_name)
    }

    pub fn data_fetcher_coordinates(&self) -> impl Iterator<Item = &FieldCoordinate> {
        self.data_fetchers.keys()
    }

    /// A builder seeded with this registry, for transformations of a built schema.
    pub fn to_builder(&self) -> CodeRegistryBuilder {
        CodeRegistryBuilder {
            data_fetchers: self.data_fetchers.clone(),
            type_resolvers: self.type_resolvers.clone(),
            default_data_fetcher: Some(self.default_data_fetcher.clone()),
        }
    }
}

impl Default for CodeRegistry {
    fn default() -> Self {
        CodeRegistryBuilder::default().build()
    }
}

impl fmt::Debug for CodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeRegistry")
            .field(
                "data_fetchers",
                &self
                    .data_fetchers
                    .keys()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>(),
            )
            .field(
                "type_resolvers",
                &self.type_resolvers.keys().collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Default)]
pub struct CodeRegistryBuilder {
    data_fetchers: IndexMap<FieldCoordinate, Arc<dyn DataFetcher>>,
    type_resolvers: IndexMap<Name, Arc<dyn TypeResolver>>,
    default_data_fetcher: Option<Arc<dyn DataFetcher>>,
}

impl CodeRegistryBuilder {
    pub fn data_fetcher(
        &mut self,
        coordinate: FieldCoordinate,
        fetcher: Arc<dyn DataFetcher>,
    ) -> &mut Self {
        self.data_fetchers.insert(coordinate, fetcher);
        self
    }

    pub fn get_data_fetcher(&self, coordinate: &FieldCoordinate) -> Option<&Arc<dyn DataFetcher>> {
        self.data_fetchers.get(coordinate)
    }

    pub fn type_resolver(&mut self, type_name: Name, resolver: Arc<dyn TypeResolver>) -> &mut Self {
        self.type_resolvers.insert(type_name, resolver);
        self
    }

    pub fn get_type_resolver(&self, type_name: &str) -> Option<&Arc<dyn TypeResolver>> {
        self.type_resolvers.get(type_name)
    }

    pub fn default_data_fetcher(&mut self, fetcher: Arc<dyn DataFetcher>) -> &mut Self {
        self.default_data_fetcher = Some(fetcher);
        self
    }

    pub fn build(&self) -> CodeRegistry {
        CodeRegistry {
            data_fetchers: self.data_fetchers.clone(),
            type_resolvers: self.type_resolvers.clone(),
            default_data_fetcher: self
                .default_data_fetcher
                .clone()
                .unwrap_or_else(|| Arc::new(PropertyDataFetcher)),
        }
    }
}
