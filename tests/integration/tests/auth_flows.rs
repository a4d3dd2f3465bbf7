//! Authentication enable/disable and SASL reordering scenarios.

use ely_cli::cli::{DisableArgs, MechanismArgs, SecurityCommand};
use ely_model::{
    op, Address, AuthFactorySpec, AuthMechanism, MechanismConfig, MechanismKind,
    PropertiesRealmConfig, ResourceType,
};
use ely_security::{auth, service, AuthEndpoint, AuthSecurityBuilder, MatchPolicy, NewResourceNames};
use serde_json::json;

use crate::common::{application_security_domain, http_interface, native_interface, TestEnv};

const SASL_FACTORY: &str = "management-sasl-authentication";

fn basic(realm: &str, users_file: &str) -> AuthMechanism {
    AuthMechanism::new(
        MechanismKind::Basic,
        MechanismConfig::Properties(PropertiesRealmConfig {
            exposed_realm_name: realm.into(),
            users_file: users_file.into(),
            groups_file: None,
            relative_to: None,
        }),
    )
}

fn basic_args() -> MechanismArgs {
    MechanismArgs {
        mechanism: Some(MechanismKind::Basic),
        user_properties_file: Some("app-users.properties".into()),
        user_properties_realm_name: Some("AppRealm".into()),
        no_reload: true,
        ..MechanismArgs::default()
    }
}

fn remove_sasl(mechanisms: &[&str]) -> SecurityCommand {
    SecurityCommand::DisableSaslManagement {
        management_interface: None,
        disable: DisableArgs {
            mechanisms: mechanisms.iter().map(|m| (*m).to_string()).collect(),
            no_reload: true,
        },
    }
}

fn reorder(order: &[&str]) -> SecurityCommand {
    SecurityCommand::ReorderSaslManagement {
        management_interface: None,
        mechanisms_order: order.iter().map(|m| (*m).to_string()).collect(),
        no_reload: true,
    }
}

/// A new mechanism stages realm, domain and factory, then its entry.
#[tokio::test]
async fn new_basic_mechanism_creates_the_whole_chain() -> anyhow::Result<()> {
    let env = TestEnv::new();

    let outcome = AuthSecurityBuilder::for_mechanism(basic("Custom", "custom-users.properties"), AuthFactorySpec::Http)
        .build(env.store.as_ref())
        .await?;
    let steps: Vec<_> = outcome
        .plan
        .steps()
        .iter()
        .map(|s| (s.name.as_str(), s.address.to_string()))
        .collect();
    assert_eq!(
        steps,
        vec![
            (op::ADD, "/subsystem=elytron/properties-realm=Custom-properties-realm".to_string()),
            (op::ADD, "/subsystem=elytron/security-domain=Custom-properties-realm-security-domain".to_string()),
            (op::ADD, "/subsystem=elytron/http-authentication-factory=Custom-http-authentication-factory".to_string()),
            (
                op::WRITE_ATTRIBUTE,
                "/subsystem=elytron/http-authentication-factory=Custom-http-authentication-factory".to_string()
            ),
        ]
    );
    assert_eq!(outcome.plan.steps()[3].param_str("name"), Some("mechanism-configurations"));
    Ok(())
}

/// Taken names get a numeric suffix.
#[tokio::test]
async fn realm_name_collision_gets_a_suffix() -> anyhow::Result<()> {
    let env = TestEnv::new();
    env.store.insert(
        Address::elytron_resource(ResourceType::PropertiesRealm, "ManagementRealm-properties-realm"),
        json!({"users-properties": {"path": "someone-else.properties"}, "groups-attribute": "groups"}),
    );

    let outcome = AuthSecurityBuilder::for_mechanism(
        basic("ManagementRealm", "mine.properties"),
        AuthFactorySpec::Http,
    )
    .build(env.store.as_ref())
    .await?;
    assert_eq!(
        outcome.plan.steps()[0].address.name(),
        Some("ManagementRealm-properties-realm-1")
    );
    Ok(())
}

/// Enabling the same mechanism twice leaves the second run nothing to do.
#[tokio::test]
async fn enabling_application_auth_twice_is_a_no_op() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let enable = || SecurityCommand::EnableHttpAuthHttpServer {
        security_domain: "shop".into(),
        mechanism: basic_args(),
    };

    env.run(enable()).await?;
    let domain = application_security_domain("shop");
    assert!(env.store.contains(&domain));
    let factory = env
        .string_attribute(&domain, "http-authentication-factory")
        .ok_or_else(|| anyhow::anyhow!("application domain has no factory"))?;
    assert_eq!(factory, "AppRealm-http-authentication-factory");
    assert_eq!(env.mechanisms(&factory, AuthFactorySpec::Http).await?, ["BASIC"]);

    env.store.clear_executed();
    env.run(enable()).await?;
    assert!(env.store.executed_writes().is_empty());
    Ok(())
}

/// An identical mechanism entry stages nothing; a different one replaces
/// the entry at its position.
#[tokio::test]
async fn existing_mechanism_is_replaced_in_place() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let factory = auth::get_auth_factory(env.store.as_ref(), SASL_FACTORY, AuthFactorySpec::Sasl)
        .await?
        .ok_or_else(|| anyhow::anyhow!("missing {SASL_FACTORY}"))?;
    let digest = |realm: &str| {
        AuthMechanism::new(
            MechanismKind::DigestMd5,
            MechanismConfig::Properties(PropertiesRealmConfig {
                exposed_realm_name: realm.into(),
                users_file: "mgmt-users.properties".into(),
                groups_file: None,
                relative_to: None,
            }),
        )
    };

    let unchanged = auth::add_auth_mechanism(env.store.as_ref(), &factory, &digest("ManagementRealm")).await?;
    assert!(unchanged.is_none());

    let replaced = auth::add_auth_mechanism(env.store.as_ref(), &factory, &digest("OtherRealm"))
        .await?
        .ok_or_else(|| anyhow::anyhow!("nothing staged"))?;
    assert_eq!(
        replaced.params.get("value"),
        Some(&json!([
            {"mechanism-name": "JBOSS-LOCAL-USER", "realm-mapper": "local"},
            {"mechanism-name": "DIGEST-MD5", "mechanism-realm-configurations": [{"realm-name": "OtherRealm"}]}
        ]))
    );
    Ok(())
}

/// Removing every mechanism, or one that is not there, leaves the factory
/// alone.
#[tokio::test]
async fn removing_all_mechanisms_is_refused() -> anyhow::Result<()> {
    let env = TestEnv::new().with_out_of_the_box_bindings();

    let err = env.run(remove_sasl(&["JBOSS-LOCAL-USER", "DIGEST-MD5"])).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Error: All mechanisms would be removed, this would fully disable access."
    );

    let err = env.run(remove_sasl(&["PLAIN"])).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("Mechanism PLAIN is not contained in factory {SASL_FACTORY}")
    );

    assert!(env.store.executed_writes().is_empty());
    assert_eq!(
        env.mechanisms(SASL_FACTORY, AuthFactorySpec::Sasl).await?,
        ["JBOSS-LOCAL-USER", "DIGEST-MD5"]
    );

    env.run(remove_sasl(&["JBOSS-LOCAL-USER"])).await?;
    assert_eq!(env.mechanisms(SASL_FACTORY, AuthFactorySpec::Sasl).await?, ["DIGEST-MD5"]);
    Ok(())
}

/// Reordering only accepts a permutation of the current mechanisms.
#[tokio::test]
async fn reorder_requires_a_permutation() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let err = env.run(reorder(&["DIGEST-MD5", "JBOSS-LOCAL-USER"])).await.unwrap_err();
    assert_eq!(err.to_string(), "No SASL factory to re-order");

    let env = env.with_out_of_the_box_bindings();
    let err = env.run(reorder(&["DIGEST-MD5"])).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Mechanism list is not complete, existing mechanisms are:[JBOSS-LOCAL-USER, DIGEST-MD5]"
    );

    let err = env
        .run(reorder(&["DIGEST-MD5", "JBOSS-LOCAL-USER", "PLAIN"]))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("Mechanism PLAIN is not contained in SASL factory {SASL_FACTORY}")
    );
    assert!(env.store.executed_writes().is_empty());

    let order = vec!["DIGEST-MD5".to_string(), "JBOSS-LOCAL-USER".to_string()];
    let outcome = service::plan_reorder_sasl(env.store.as_ref(), "http-interface", order).await?;
    assert_eq!(outcome.auth_factory.name, SASL_FACTORY);
    assert_eq!(outcome.auth_factory.mechanism_names(), ["DIGEST-MD5", "JBOSS-LOCAL-USER"]);

    env.run(reorder(&["DIGEST-MD5", "JBOSS-LOCAL-USER"])).await?;
    assert_eq!(
        env.mechanisms(SASL_FACTORY, AuthFactorySpec::Sasl).await?,
        ["DIGEST-MD5", "JBOSS-LOCAL-USER"]
    );
    Ok(())
}

/// Certificate authentication goes through a key-store realm named after
/// the trust store.
#[tokio::test]
async fn client_cert_uses_a_trust_store_realm() -> anyhow::Result<()> {
    let env = TestEnv::new().with_key_store("ts", "trust.jks", "secret");

    env.run(SecurityCommand::EnableHttpAuthManagement {
        mechanism: MechanismArgs {
            mechanism: Some(MechanismKind::ClientCert),
            client_cert_trust_store: Some("ts".into()),
            no_reload: true,
            ..MechanismArgs::default()
        },
    })
    .await?;

    assert!(env
        .store
        .contains(&Address::elytron_resource(ResourceType::KeyStoreRealm, "ks-realm-ts")));
    let factory = env
        .string_attribute(&http_interface(), "http-authentication-factory")
        .ok_or_else(|| anyhow::anyhow!("http-interface has no factory"))?;
    assert_eq!(factory, "ks-realm-ts-http-authentication-factory");
    assert_eq!(env.mechanisms(&factory, AuthFactorySpec::Http).await?, ["CLIENT-CERT"]);
    Ok(())
}

/// A missing trust store is reported before anything is written.
#[tokio::test]
async fn client_cert_needs_an_existing_trust_store() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let endpoint = AuthEndpoint::ManagementHttp("http-interface".into());
    let mut options = service::MechanismOptions::new(MechanismKind::ClientCert);
    options.trust_store = Some("missing".into());

    let err = service::build_mechanism(env.store.as_ref(), endpoint.spec(), &options)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Can't configure 'certificate' authentication, no trustore missing"
    );
    assert!(env.store.executed_writes().is_empty());
    Ok(())
}

/// Without a mechanism the shipped factories are bound, and unbound again
/// on disable.
#[tokio::test]
async fn out_of_the_box_factories_bind_and_unbind() -> anyhow::Result<()> {
    let env = TestEnv::new();

    env.run(SecurityCommand::EnableSaslManagement {
        management_interface: Some("native-interface".into()),
        mechanism: MechanismArgs {
            no_reload: true,
            ..MechanismArgs::default()
        },
    })
    .await?;
    assert_eq!(
        env.string_attribute(&native_interface(), "sasl-authentication-factory").as_deref(),
        Some(SASL_FACTORY)
    );

    env.run(SecurityCommand::EnableHttpAuthManagement {
        mechanism: MechanismArgs {
            no_reload: true,
            ..MechanismArgs::default()
        },
    })
    .await?;
    assert_eq!(
        env.string_attribute(&http_interface(), "http-authentication-factory").as_deref(),
        Some("management-http-authentication")
    );

    env.run(SecurityCommand::DisableHttpAuthManagement {
        disable: DisableArgs {
            mechanisms: Vec::new(),
            no_reload: true,
        },
    })
    .await?;
    env.run(SecurityCommand::DisableSaslManagement {
        management_interface: Some("native-interface".into()),
        disable: DisableArgs {
            mechanisms: Vec::new(),
            no_reload: true,
        },
    })
    .await?;
    assert_eq!(env.string_attribute(&http_interface(), "http-authentication-factory"), None);
    assert_eq!(env.string_attribute(&native_interface(), "sasl-authentication-factory"), None);
    assert!(env
        .store
        .contains(&Address::elytron_resource(ResourceType::HttpAuthenticationFactory, "management-http-authentication")));
    Ok(())
}

/// A new mechanism on a bound interface joins the active factory instead
/// of replacing it.
#[tokio::test]
async fn active_factory_gains_the_mechanism() -> anyhow::Result<()> {
    let env = TestEnv::new().with_out_of_the_box_bindings();
    let endpoint = AuthEndpoint::ManagementSasl("http-interface".into());
    let mut options = service::MechanismOptions::new(MechanismKind::JbossLocalUser);
    options.super_user = true;
    let mechanism = service::build_mechanism(env.store.as_ref(), endpoint.spec(), &options).await?;

    let outcome = service::plan_enable_auth(
        env.store.as_ref(),
        &endpoint,
        Some(mechanism),
        NewResourceNames::default(),
        MatchPolicy::FailClosed,
    )
    .await?;
    assert_eq!(outcome.auth_factory.name, SASL_FACTORY);
    assert!(outcome.plan.steps().iter().all(|s| s.name == op::WRITE_ATTRIBUTE));
    assert!(outcome.plan.steps().iter().all(|s| s.address != http_interface()));
    Ok(())
}
