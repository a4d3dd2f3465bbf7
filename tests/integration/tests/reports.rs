//! Security reports after configuration changes.

use ely_cli::cli::{MechanismArgs, SecurityCommand, SslArgs};
use ely_model::AuthFactorySpec;
use ely_security::info;

use crate::common::TestEnv;

/// The management report follows SSL and authentication changes.
#[tokio::test]
async fn management_report_shows_bound_resources() -> anyhow::Result<()> {
    let env = TestEnv::new()
        .with_out_of_the_box_bindings()
        .with_key_store("ks", "server.jks", "secret");

    let before = info::management_info(env.store.as_ref()).await?;
    assert!(!before.interfaces[0].ssl.enabled);

    env.run(SecurityCommand::EnableSslManagement {
        management_interface: None,
        http_secure_socket_binding: None,
        ssl: SslArgs {
            key_store_name: Some("ks".into()),
            no_reload: true,
            ..SslArgs::default()
        },
    })
    .await?;

    let report = info::management_info(env.store.as_ref()).await?;
    let [http_interface, native_interface] = report.interfaces.as_slice() else {
        anyhow::bail!("expected two interfaces, got {}", report.interfaces.len());
    };

    assert_eq!(http_interface.interface, "http-interface");
    assert_eq!(http_interface.ssl.ssl_context.as_deref(), Some("ssl-context-ks"));
    assert_eq!(http_interface.ssl.key_manager.as_deref(), Some("key-manager-ks"));
    assert_eq!(http_interface.ssl.key_store.as_deref(), Some("ks"));

    let http = http_interface
        .http
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("http-interface serves HTTP"))?;
    assert_eq!(http.factory.as_deref(), Some("management-http-authentication"));
    assert_eq!(http.security_domain.as_deref(), Some("ManagementDomain"));
    assert_eq!(http.mechanisms[0].line(), "DIGEST realm-name=ManagementRealm");

    assert_eq!(http_interface.sasl.spec, AuthFactorySpec::Sasl);
    let sasl: Vec<_> = http_interface.sasl.mechanisms.iter().map(|m| m.line()).collect();
    assert_eq!(sasl, ["JBOSS-LOCAL-USER realm-mapper=local", "DIGEST-MD5 realm-name=ManagementRealm"]);

    assert_eq!(native_interface.interface, "native-interface");
    assert!(!native_interface.ssl.enabled);
    assert!(native_interface.http.is_none());
    assert!(!native_interface.sasl.enabled);

    let lines = report.lines();
    assert!(lines.iter().any(|l| l == "Server SSLContext: ssl-context-ks"));
    assert!(lines.iter().any(|l| l == "SASL authentication enabled: false"));
    Ok(())
}

/// The HTTP server report lists every application security domain.
#[tokio::test]
async fn http_server_report_lists_application_domains() -> anyhow::Result<()> {
    let env = TestEnv::new();

    let empty = info::http_server_info(env.store.as_ref(), None).await?;
    assert_eq!(empty.server, "default-server");
    assert!(empty.lines().iter().any(|l| l == "No application security domains."));

    env.run(SecurityCommand::EnableHttpAuthHttpServer {
        security_domain: "shop".into(),
        mechanism: MechanismArgs {
            no_reload: true,
            ..MechanismArgs::default()
        },
    })
    .await?;

    let report = info::http_server_info(env.store.as_ref(), Some("default-server".into())).await?;
    assert!(!report.ssl.enabled);
    let [shop] = report.application_security_domains.as_slice() else {
        anyhow::bail!("expected one domain");
    };
    assert_eq!(shop.name, "shop");
    assert_eq!(shop.http.factory.as_deref(), Some("application-http-authentication"));
    assert_eq!(shop.http.security_domain.as_deref(), Some("ApplicationDomain"));
    let mechanisms: Vec<_> = shop.http.mechanisms.iter().map(|m| m.mechanism.as_str()).collect();
    assert_eq!(mechanisms, ["BASIC", "FORM"]);
    Ok(())
}
