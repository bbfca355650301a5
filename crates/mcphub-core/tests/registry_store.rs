mod support;

use serde_json::json;
use tempfile::TempDir;

use mcphub_core::config::{
    ConfigLocation, DEFAULT_CONFIG, RegistryPersistence, RegistryStore, resolve_config_path,
};
use mcphub_core::registry::{ClientDefinition, DEFAULT_SERVER_PORT, Registry, ServerDefinition};
use mcphub_core::sync::SyncOrchestrator;

use support::{object, stdio};

#[test]
fn save_then_load_roundtrip() {
    let temp = TempDir::new().unwrap();
    let store = RegistryStore::new(temp.path().join("mcphub/config.toml"));

    let registry = Registry::new(7000)
        .with_server(ServerDefinition::new(
            "zeta",
            object(json!({
                "command": "echo",
                "args": ["a", "b"],
                "env": {"KEY": "value"},
                "timeout": 30000,
                "trust": false
            })),
        ))
        .with_server(ServerDefinition::new(
            "alpha",
            object(json!({
                "type": "http",
                "url": "https://example.com/mcp",
                "headers": {"Accept": "application/json"}
            })),
        ))
        .with_client(
            "claude_code",
            ClientDefinition::new("~/.claude.json").with_enabled(["zeta"]),
        );

    store.save(&registry).unwrap();
    let loaded = store.load().unwrap();

    assert_eq!(loaded, registry);
    let names: Vec<_> = loaded.servers().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["zeta", "alpha"]);
}

#[test]
fn save_leaves_no_temp_files() {
    let temp = TempDir::new().unwrap();
    let store = RegistryStore::new(temp.path().join("config.toml"));
    let registry = Registry::default()
        .with_server(ServerDefinition::new("echo", stdio("echo")))
        .with_client("c", ClientDefinition::new("/tmp/c.json"));

    store.save(&registry).unwrap();
    store.save(&registry).unwrap();

    let entries: Vec<_> = std::fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec!["config.toml".to_string()]);
}

#[test]
fn missing_port_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(
        &path,
        "[mcpServers.echo]\ncommand = \"echo\"\n\n[clients.c]\nconfig_path = \"/tmp/c.json\"\n",
    )
    .unwrap();

    let registry = RegistryStore::new(&path).load().unwrap();
    assert_eq!(registry.server_port(), DEFAULT_SERVER_PORT);
    assert!(registry.client("c").unwrap().enabled.is_empty());
}

#[test]
fn load_reports_line_context() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "server_port = 6543\n[clients.c\nconfig_path = \"x\"\n").unwrap();

    let err = RegistryStore::new(&path).load().unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("Failed to parse config file"));
    assert!(message.contains("TOML parsing error"));
}

#[test]
fn read_raw_returns_document_text() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "# hand written\nserver_port = 6543\n").unwrap();

    let store = RegistryStore::new(&path);
    assert_eq!(store.path(), path.as_path());
    assert_eq!(
        store.read_raw().unwrap(),
        "# hand written\nserver_port = 6543\n"
    );
}

#[test]
fn resolution_prefers_user_config_then_cwd() {
    let temp = TempDir::new().unwrap();
    let user_config = temp.path().join("user/mcphub/config.toml");
    let cwd = temp.path().join("work");
    std::fs::create_dir_all(&cwd).unwrap();

    assert_eq!(
        resolve_config_path(None, &user_config, &cwd),
        ConfigLocation::Missing(user_config.clone())
    );

    std::fs::write(cwd.join("config.toml"), "").unwrap();
    assert_eq!(
        resolve_config_path(None, &user_config, &cwd),
        ConfigLocation::Existing(cwd.join("config.toml"))
    );

    std::fs::create_dir_all(user_config.parent().unwrap()).unwrap();
    std::fs::write(&user_config, "").unwrap();
    assert_eq!(
        resolve_config_path(None, &user_config, &cwd),
        ConfigLocation::Existing(user_config.clone())
    );

    let explicit = temp.path().join("explicit.toml");
    let explicit_str = explicit.to_string_lossy().into_owned();
    assert_eq!(
        resolve_config_path(Some(explicit_str.as_str()), &user_config, &cwd),
        ConfigLocation::Missing(explicit)
    );
}

#[test]
fn resolve_writes_default_template_when_nothing_exists() {
    let temp = TempDir::new().unwrap();
    let user_config = temp.path().join("user/mcphub/config.toml");
    let cwd = temp.path().join("work");
    std::fs::create_dir_all(&cwd).unwrap();

    let store = RegistryStore::resolve_in(None, &user_config, &cwd).unwrap();
    assert_eq!(store.path(), user_config.as_path());
    assert_eq!(std::fs::read_to_string(&user_config).unwrap(), DEFAULT_CONFIG);

    let registry = store.load().unwrap();
    assert_eq!(registry.server_port(), DEFAULT_SERVER_PORT);
    assert!(!registry.servers().is_empty());
    assert!(registry.client("claude_code").is_some());
    assert!(registry.client("gemini_cli").is_some());
}

#[test]
fn orchestrator_persists_through_store() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    let client_path = temp.path().join("client.json");
    let registry = Registry::default()
        .with_server(ServerDefinition::new("echo", stdio("echo")))
        .with_client(
            "c",
            ClientDefinition::new(client_path.to_string_lossy().into_owned()),
        );
    let store = RegistryStore::new(&path);
    store.save(&registry).unwrap();

    let mut hub = SyncOrchestrator::open(store.clone()).unwrap();
    hub.toggle_client_server("c", "echo", true).unwrap();
    hub.add_server("http", object(json!({"httpUrl": "https://example.com"})))
        .unwrap();

    let reloaded = store.load().unwrap();
    assert!(reloaded.client("c").unwrap().is_enabled("echo"));
    let names: Vec<_> = reloaded.servers().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["echo", "http"]);
    assert!(client_path.exists());
}
