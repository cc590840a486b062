// Registry behaviour under concurrent registration and lookup

mod common;

use common::{create_test_broker, SERVER_URL};
use entitybroker::{
    domain::{template::TemplateKey, Capability},
    error::BrokerError,
    services::{ActionReturn, CustomAction, EntityBroker, ProviderRegistration},
};
use std::collections::HashMap;
use url::Url;

#[test]
fn test_concurrent_readers_see_whole_entries() {
    let broker = EntityBroker::new(Url::parse(SERVER_URL).unwrap());
    broker.register_provider(ProviderRegistration::new("site")).unwrap();

    let custom = || {
        ProviderRegistration::new("site").with_template(TemplateKey::Show, "/{prefix}/item/{id}")
    };

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for i in 0..200 {
                if i % 2 == 0 {
                    broker.register_provider(custom()).unwrap();
                } else {
                    broker.register_provider(ProviderRegistration::new("site")).unwrap();
                }
            }
        });

        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..200 {
                    let entry = broker.registry().provider("site").unwrap();
                    // five keys either way: custom show plus four defaults, or all defaults
                    assert_eq!(entry.templates.len(), 5);
                    let customised = entry.has_capability(Capability::ViewUrlCustomizable);
                    assert_eq!(customised, entry.templates[0].template == "/{prefix}/item/{id}");
                }
            });
        }
    });

    assert_eq!(broker.registry().len(), 1);
}

#[test]
fn test_concurrent_registration_of_distinct_prefixes() {
    let broker = EntityBroker::new(Url::parse(SERVER_URL).unwrap());

    std::thread::scope(|scope| {
        for t in 0..4 {
            let broker = &broker;
            scope.spawn(move || {
                for i in 0..25 {
                    let prefix = format!("p{}_{}", t, i);
                    broker.register_provider(ProviderRegistration::new(&prefix)).unwrap();
                }
            });
        }
    });

    assert_eq!(broker.registry().len(), 100);
    let view = broker.parse_entity_url("/p3_24/abc").unwrap().unwrap();
    assert_eq!(view.reference.prefix(), "p3_24");
}

#[test]
fn test_unregister_removes_actions_and_urls() {
    let broker = create_test_broker();
    assert!(broker.parse_entity_url("/site/abc").unwrap().is_some());

    assert!(broker.unregister_provider("site"));
    assert_eq!(broker.parse_entity_url("/site/abc").unwrap(), None);
    assert!(broker.registry().action_names("site").is_empty());
    assert!(!broker.unregister_provider("site"));
}

#[test]
fn test_capability_removal_keeps_provider() {
    let broker = create_test_broker();

    broker
        .registry()
        .unregister_capability("site", Capability::ActionsExecutable)
        .unwrap();
    assert!(broker
        .registry()
        .provider_with_capability("site", Capability::ActionsExecutable)
        .is_none());
    assert!(broker.parse_reference("/site/abc").unwrap().is_some());

    assert_eq!(
        broker.registry().unregister_capability("site", Capability::EntityProvider),
        Err(BrokerError::RootCapability("site".to_string()))
    );
}

#[test]
fn test_actions_stop_after_capability_removal() {
    let broker = create_test_broker();
    let view = broker.parse_entity_url("/site/abc/summary").unwrap().unwrap();
    assert!(broker.execute_action(&view, "summary", HashMap::new()).is_ok());

    broker
        .registry()
        .unregister_capability("site", Capability::ActionsExecutable)
        .unwrap();
    assert!(broker.requested_action(&view).is_none());
    assert!(matches!(
        broker.execute_action(&view, "summary", HashMap::new()),
        Err(BrokerError::UnknownAction { .. })
    ));
    assert!(broker.registry().action_names("site").is_empty());
}

#[test]
fn test_reregistration_drops_actions() {
    let broker = create_test_broker();
    broker.register_provider(ProviderRegistration::new("site")).unwrap();

    let entry = broker.registry().provider("site").unwrap();
    assert!(!entry.has_capability(Capability::ActionsExecutable));
    assert!(!entry.has_capability(Capability::Redirectable));

    let view = broker.parse_entity_url("/site/abc/summary").unwrap().unwrap();
    assert!(broker.requested_action(&view).is_none());
}

#[test]
fn test_actions_and_unregister_race() {
    let broker = EntityBroker::new(Url::parse(SERVER_URL).unwrap());
    let ping = || vec![CustomAction::new("ping", |_| Ok(ActionReturn::Text("pong".to_string())))];

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for _ in 0..200 {
                broker.register_provider(ProviderRegistration::new("site")).unwrap();
                broker.unregister_provider("site");
            }
        });
        scope.spawn(|| {
            for _ in 0..200 {
                // either the provider is there and takes the table, or it is gone
                match broker.register_actions("site", ping()) {
                    Ok(()) | Err(BrokerError::UnknownProvider(_)) => {}
                    Err(e) => panic!("unexpected error: {}", e),
                }
            }
        });
    });

    // whatever interleaving happened, a table never outlives its provider
    if broker.registry().provider("site").is_none() {
        assert!(broker.registry().action_names("site").is_empty());
    }
    broker.unregister_provider("site");
    broker.register_provider(ProviderRegistration::new("site")).unwrap();
    assert!(broker.registry().action_names("site").is_empty());
}

#[test]
fn test_dotted_prefix_is_rejected() {
    let broker = EntityBroker::new(Url::parse(SERVER_URL).unwrap());

    let result = broker.register_provider(ProviderRegistration::new("my.site"));
    assert!(matches!(result, Err(BrokerError::InvalidPrefix(_))));
    assert!(broker.registry().is_empty());

    // the dot would be read as an extension anyway
    broker.register_provider(ProviderRegistration::new("my")).unwrap();
    let view = broker.parse_entity_url("/my.site").unwrap().unwrap();
    assert_eq!(view.reference.prefix(), "my");
    assert_eq!(view.extension.as_deref(), Some("site"));
}

#[test]
fn test_reserved_actions_are_rejected() {
    let broker = create_test_broker();

    for name in ["describe", "new", "edit", "delete"] {
        let action = CustomAction::new(name, |_| Ok(ActionReturn::Text(String::new())));
        let result = broker.register_actions("site", vec![action]);
        assert!(matches!(result, Err(BrokerError::ReservedAction { .. })), "{}", name);
    }

    // the earlier table survives a rejected registration
    assert_eq!(
        broker.registry().action_names("site"),
        vec!["archive", "boom", "stats", "summary"]
    );
}

#[test]
fn test_unknown_action_message() {
    let broker = create_test_broker();
    let view = broker.parse_entity_url("/site/abc").unwrap().unwrap();

    let err = broker
        .execute_action(&view, "export", HashMap::new())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid action (export), this action is not a supported custom action for prefix (site)"
    );
}

#[test]
fn test_full_url_round_trip() {
    let broker = create_test_broker();

    let url = broker
        .entity_url("/site/abc", Some(TemplateKey::Delete), Some("json"))
        .unwrap();
    assert_eq!(url, "http://localhost:8080/direct/site/abc/delete.json");

    let view = broker.parse_full_url(&url).unwrap().unwrap();
    assert_eq!(view.view_key, TemplateKey::Delete);
    assert_eq!(view.reference.id(), Some("abc"));
    assert_eq!(view.extension.as_deref(), Some("json"));
}
