//! End-to-end tests of the `sqlview` binary in `--execute` mode.

use assert_cmd::Command;
use rusqlite::Connection;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "").unwrap();
        let conn = Connection::open(dir.path().join("shop.db")).unwrap();
        conn.execute_batch(
            "CREATE TABLE products (id INTEGER PRIMARY KEY, name TEXT, price REAL);
             INSERT INTO products (name, price) VALUES ('Lamp', 12.5), ('Desk, oak', 140.0);",
        )
        .unwrap();
        Workspace { dir }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).to_string_lossy().into_owned()
    }

    fn sqlview(&self) -> Command {
        let mut cmd = Command::cargo_bin("sqlview").unwrap();
        cmd.env_remove("SQLVIEW_PASSWORD")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(self.path("config.toml"));
        cmd
    }

    fn run(&self, args: &[&str]) -> (bool, String, String) {
        let output = self.sqlview().args(args).output().unwrap();
        (
            output.status.success(),
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
        )
    }
}

#[test]
fn test_help_lists_flags() {
    let ws = Workspace::new();
    let (ok, stdout, _) = ws.run(&["--help"]);
    assert!(ok);
    for flag in ["--server", "--database", "--table", "--execute", "--sqlite", "--theme"] {
        assert!(stdout.contains(flag), "missing {flag} in help");
    }
}

#[test]
fn test_execute_select_as_text() {
    let ws = Workspace::new();
    let db = ws.path("shop.db");
    let (ok, stdout, stderr) = ws.run(&["--sqlite", &db, "-e", "SELECT name, price FROM products ORDER BY id"]);
    assert!(ok, "{stderr}");
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].starts_with("name"));
    assert!(lines[2].starts_with("Lamp"));
    assert!(lines[2].contains("12.5"));
    assert_eq!(lines.len(), 4);
}

#[test]
fn test_execute_select_as_csv_and_json() {
    let ws = Workspace::new();
    let db = ws.path("shop.db");
    let (ok, stdout, _) = ws.run(&["--sqlite", &db, "-e", "SELECT name FROM products ORDER BY id", "--format", "csv"]);
    assert!(ok);
    assert_eq!(stdout, "name\nLamp\n\"Desk, oak\"\n");

    let (ok, stdout, _) = ws.run(&["--sqlite", &db, "-e", "select id from products order by id", "-f", "json"]);
    assert!(ok);
    assert_eq!(stdout.trim_end(), r#"[{"id":"1"},{"id":"2"}]"#);
}

#[test]
fn test_execute_command_reports_rows_affected() {
    let ws = Workspace::new();
    let db = ws.path("shop.db");
    let (ok, stdout, _) = ws.run(&["--sqlite", &db, "-e", "UPDATE products SET price = price * 2"]);
    assert!(ok);
    assert_eq!(stdout.trim(), "2 rows affected");

    // Committed, so a second process sees it
    let (_, stdout, _) = ws.run(&["--sqlite", &db, "-e", "SELECT price FROM products WHERE id = 1", "-f", "csv"]);
    assert_eq!(stdout, "price\n25\n");
}

#[test]
fn test_execute_bad_sql_fails_with_query_error() {
    let ws = Workspace::new();
    let db = ws.path("shop.db");
    let (ok, stdout, stderr) = ws.run(&["--sqlite", &db, "-e", "SELECT * FROM nope"]);
    assert!(!ok);
    assert!(stdout.is_empty());
    assert!(stderr.contains("Query error"), "{stderr}");
    assert!(stderr.contains("nope"), "{stderr}");
}

#[test]
fn test_execute_unknown_database_fails() {
    let ws = Workspace::new();
    let db = ws.path("shop.db");
    let (ok, _, stderr) = ws.run(&["--sqlite", &db, "-d", "archive", "-e", "SELECT 1"]);
    assert!(!ok);
    assert!(stderr.contains("archive"), "{stderr}");
}

#[test]
fn test_missing_server_is_configuration_error() {
    let ws = Workspace::new();
    let (ok, _, stderr) = ws.run(&["-e", "SELECT 1"]);
    assert!(!ok);
    assert!(stderr.contains("Configuration error"), "{stderr}");
}

#[test]
fn test_missing_config_file_is_configuration_error() {
    let ws = Workspace::new();
    let missing = ws.path("absent.toml");
    let output = Command::cargo_bin("sqlview")
        .unwrap()
        .args(["--config", &missing, "--sqlite", ":memory:", "-e", "SELECT 1"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Configuration error"));
}

#[test]
fn test_sqlite_backend_from_config_file() {
    let ws = Workspace::new();
    let config = format!(
        "[database]\nbackend = \"sqlite\"\npath = {:?}\ndatabase = \"main\"\n\n[ui]\ntheme = \"dark\"\n",
        ws.path("shop.db")
    );
    std::fs::write(ws.path("config.toml"), config).unwrap();
    let (ok, stdout, stderr) = ws.run(&["-e", "SELECT count(*) AS n FROM products", "-f", "markdown"]);
    assert!(ok, "{stderr}");
    assert_eq!(stdout, "n\n---\n2\n");
}
