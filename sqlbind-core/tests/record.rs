#[cfg(test)]
mod tests {
    use sqlbind_core::{
        MODEL, Model, Record, RecordRegistry, RecordType, RowLabeled, StatementError, Value,
    };
    use std::sync::Arc;

    fn row() -> RowLabeled {
        RowLabeled::new(
            ["id", "name"].into_iter().map(String::from).collect(),
            vec![Value::Int64(Some(5)), Value::Varchar(Some("eve".into()))].into(),
        )
    }

    #[test]
    fn registry() {
        let mut registry = RecordRegistry::new();
        assert!(registry.contains(MODEL));
        assert!(registry.resolve(MODEL).expect("Always known").is_open());
        registry.register(RecordType::closed("User", ["id", "name"]));
        let user = registry.resolve("User").expect("Registered");
        assert!(user.accepts("name"));
        assert!(!user.accepts("email"));

        // Replaced by name
        registry.register(RecordType::open("User"));
        assert!(registry.resolve("User").expect("Registered").is_open());

        let error = registry.resolve("Ghost").expect_err("Unknown");
        assert_eq!(
            StatementError::of(&error),
            Some(&StatementError::InvalidResultType {
                name: "Ghost".into()
            })
        );
    }

    #[test]
    fn model() {
        let mut model = Model::hydrate(row(), RecordType::model()).expect("Open shape");
        assert_eq!(model.len(), 2);
        assert_eq!(model.get_as::<String>("name").expect("Text"), "eve");
        assert!(model.get_as::<String>("email").is_err());
        assert_eq!(
            model.set("name", "mallory"),
            Some(Value::Varchar(Some("eve".into())))
        );
        assert_eq!(model.set("email", "x"), None);
        let pairs: Vec<_> = model.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(pairs, ["id", "name"]);
        model.expect_type(MODEL).expect("Is a model");

        let row: RowLabeled = model.clone().into();
        assert_eq!(row.get_column("name"), model.get("name"));
        let owned: Vec<(String, Value)> = model.into_iter().collect();
        assert_eq!(owned[0], ("id".to_string(), Value::Int64(Some(5))));
    }

    #[test]
    fn closed_shape() {
        let narrow = Arc::new(RecordType::closed("Id", ["id"]));
        let error = Model::hydrate(row(), narrow).expect_err("Extra column");
        assert!(matches!(
            StatementError::of(&error),
            Some(StatementError::UnknownField { field, .. }) if field == "name"
        ));

        let wide = Arc::new(RecordType::closed("User", ["id", "name", "email"]));
        let model = Model::hydrate(row(), wide).expect("Missing columns are fine");
        assert_eq!(model.get("email"), None);
        assert!(model.expect_type(MODEL).is_err());
        assert!(Model::from_model(model).is_ok());
    }
}
