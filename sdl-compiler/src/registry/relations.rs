//! Type relations over a registry: abstract-type membership and field-type subtyping.

use apollo_compiler::Name;
use apollo_compiler::ast;
use indexmap::IndexSet;

use super::TypeDefinition;
use super::TypeDefinitionRegistry;

impl TypeDefinitionRegistry {
    /// Whether `possible` is a member of the abstract type `abstract_type`.
    ///
    /// For unions this looks at the members of the union and its extensions. For interfaces it
    /// follows `implements` clauses transitively, so an object implementing `B` where
    /// `interface B implements A` is a possible type of `A`.
    pub fn is_possible_type(&self, abstract_type: &str, possible: &str) -> bool {
        match self.get_type(abstract_type) {
            Some(TypeDefinition::Union(_)) => self
                .all_union_members(abstract_type)
                .iter()
                .any(|member| member.as_str() == possible),
            Some(TypeDefinition::Interface(_)) => {
                self.transitive_interfaces(possible).contains(abstract_type)
            }
            _ => false,
        }
    }

    /// Every interface reachable from the `implements` clauses of `type_name`, not including
    /// `type_name` itself. Cycles are tolerated.
    pub fn transitive_interfaces(&self, type_name: &str) -> IndexSet<Name> {
        let mut visited = IndexSet::new();
        let mut stack = self
            .all_implemented_interfaces(type_name)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        while let Some(interface) = stack.pop() {
            if interface.as_str() == type_name || visited.contains(&interface) {
                continue;
            }
            stack.extend(
                self.all_implemented_interfaces(&interface)
                    .into_iter()
                    .cloned(),
            );
            visited.insert(interface);
        }
        visited
    }

    /// Object types that implement `interface`, directly or through other interfaces.
    pub fn implementations_of(&self, interface: &str) -> Vec<&Name> {
        self.objects()
            .map(|object| &object.name)
            .filter(|object| self.transitive_interfaces(object).contains(interface))
            .collect()
    }

    /// Whether a field of type `maybe_sub` can implement an interface field of type `super_type`.
    ///
    /// Non-null may narrow a nullable type, lists are covariant, and a named object or interface
    /// type may narrow an interface or union it belongs to.
    pub fn is_sub_type_of(&self, maybe_sub: &ast::Type, super_type: &ast::Type) -> bool {
        use ast::Type;

        if maybe_sub == super_type {
            return true;
        }
        match (maybe_sub, super_type) {
            (Type::NonNullNamed(sub), Type::NonNullNamed(sup)) => self.is_named_sub_type(sub, sup),
            (Type::NonNullList(sub), Type::NonNullList(sup)) => self.is_sub_type_of(sub, sup),
            (Type::NonNullNamed(sub), Type::Named(sup)) => self.is_named_sub_type(sub, sup),
            (Type::NonNullList(sub), Type::List(sup)) => self.is_sub_type_of(sub, sup),
            (Type::List(sub), Type::List(sup)) => self.is_sub_type_of(sub, sup),
            (Type::Named(sub), Type::Named(sup)) => self.is_named_sub_type(sub, sup),
            _ => false,
        }
    }

    fn is_named_sub_type(&self, sub: &Name, sup: &Name) -> bool {
        sub == sup || (self.is_interface_or_union(sup) && self.is_possible_type(sup, sub))
    }
}

#[cfg(test)]
mod tests {
    use apollo_compiler::ast::Type;
    use apollo_compiler::name;

    use super::*;

    fn registry() -> TypeDefinitionRegistry {
        let mut registry = TypeDefinitionRegistry::new();
        let document = ast::Document::parse(
            r#"
            interface Node { id: ID! }
            interface Resource implements Node { id: ID! url: String }
            type Image implements Resource & Node { id: ID! url: String }
            type Text { body: String }
            union Media = Image
            extend union Media = Text
            "#,
            "schema.graphql",
        )
        .unwrap();
        registry.add_document(document);
        registry
    }

    #[test]
    fn non_null_is_a_subtype_of_nullable() {
        let registry = registry();
        let non_null = Type::NonNullNamed(name!("String"));
        let nullable = Type::Named(name!("String"));
        assert!(registry.is_sub_type_of(&non_null, &nullable));
        assert!(!registry.is_sub_type_of(&nullable, &non_null));
    }

    #[test]
    fn lists_are_covariant() {
        let registry = registry();
        let images = Type::NonNullNamed(name!("Image")).list().non_null();
        let nodes = Type::Named(name!("Node")).list();
        assert!(registry.is_sub_type_of(&images, &nodes));
        assert!(!registry.is_sub_type_of(&nodes, &images));
        assert!(!registry.is_sub_type_of(&Type::Named(name!("Image")), &nodes));
    }

    #[test]
    fn abstract_membership_follows_extensions_and_transitive_interfaces() {
        let registry = registry();
        assert!(registry.is_possible_type("Media", "Text"));
        assert!(registry.is_possible_type("Node", "Image"));
        assert!(registry.is_possible_type("Node", "Resource"));
        assert!(!registry.is_possible_type("Node", "Text"));
        assert!(!registry.is_possible_type("Text", "Text"));
        assert_eq!(
            registry.implementations_of("Node"),
            [&name!("Image")]
        );
    }

    #[test]
    fn object_narrows_union_in_field_type() {
        let registry = registry();
        assert!(registry.is_sub_type_of(
            &Type::NonNullNamed(name!("Text")),
            &Type::Named(name!("Media"))
        ));
        assert!(!registry.is_sub_type_of(
            &Type::Named(name!("Media")),
            &Type::Named(name!("Text"))
        ));
    }
}
