use super::*;
use tempfile::TempDir;

fn temp_jar() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chatline").join("cookies.json");
    (dir, path)
}

fn at(unix: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(unix).unwrap()
}

// =============================================================
// Cookie jar helpers
// =============================================================

#[test]
fn token_cookie_is_scoped_to_root() {
    let cookie = token_cookie("abc");
    assert_eq!(cookie.name(), "token");
    assert_eq!(cookie.value(), "abc");
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.expires_datetime(), None);
}

#[test]
fn jar_ignores_expired_and_empty_cookies() {
    let mut jar = CookieJar::new();
    jar.add(Cookie::build(("token", "abc")).path("/").expires(at(100)).build());
    assert_eq!(live_value(&jar, "token", at(99)).as_deref(), Some("abc"));
    assert_eq!(live_value(&jar, "token", at(100)), None);

    jar.add(token_cookie(""));
    assert_eq!(live_value(&jar, "token", at(0)), None);
}

#[test]
fn jar_ignores_cookie_on_other_path() {
    let mut jar = CookieJar::new();
    jar.add(Cookie::build(("token", "abc")).path("/admin").build());
    assert_eq!(live_value(&jar, "token", at(0)), None);
}

#[test]
fn expire_drops_only_that_cookie() {
    let mut jar = CookieJar::new();
    jar.add(token_cookie("abc"));
    jar.add(Cookie::build(("theme", "dark")).path("/").build());

    expire(&mut jar, "token", at(1_700_000_000));
    assert_eq!(jar.iter().count(), 1);
    assert_eq!(live_value(&jar, "token", at(1_700_000_000)), None);
    assert_eq!(live_value(&jar, "theme", at(1_700_000_000)).as_deref(), Some("dark"));
}

#[test]
fn expired_cookie_is_already_past() {
    let cookie = expired_cookie("token");
    assert_eq!(cookie.value(), "");
    assert!(is_expired(&cookie, at(1)));
}

// =============================================================
// MemoryStore
// =============================================================

#[test]
fn memory_store_set_then_get_round_trips() {
    let mut store = MemoryStore::new();
    for token in ["abc", "eyJhbGciOiJIUzI1NiJ9.e30.sig", "with space"] {
        store.set(token).unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some(token));
    }
}

#[test]
fn memory_store_clear_then_get_is_empty() {
    let mut store = MemoryStore::new();
    store.set("abc").unwrap();
    store.clear().unwrap();
    assert_eq!(store.get().unwrap(), None);
}

#[test]
fn memory_store_starts_empty() {
    assert_eq!(MemoryStore::new().get().unwrap(), None);
}

// =============================================================
// CookieFileStore
// =============================================================

#[test]
fn file_store_missing_file_is_empty() {
    let (_dir, path) = temp_jar();
    assert_eq!(CookieFileStore::new(path).get().unwrap(), None);
}

#[test]
fn file_store_persists_across_instances() {
    let (_dir, path) = temp_jar();
    let mut writer = CookieFileStore::new(&path);
    writer.set("abc").unwrap();

    let reader = CookieFileStore::new(&path);
    assert_eq!(reader.get().unwrap().as_deref(), Some("abc"));

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("token=abc"), "unexpected jar file: {raw}");
    assert!(raw.contains("Path=/"), "unexpected jar file: {raw}");
}

#[test]
fn file_store_clear_removes_token() {
    let (_dir, path) = temp_jar();
    let mut store = CookieFileStore::new(&path);
    store.set("abc").unwrap();
    store.clear().unwrap();
    assert_eq!(store.get().unwrap(), None);
    assert_eq!(CookieFileStore::new(&path).get().unwrap(), None);
}

#[test]
fn file_store_reads_expired_cookie_as_absent() {
    let (_dir, path) = temp_jar();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let jar = json_jar(&["token=abc; Path=/; Expires=Thu, 01 Jan 1970 00:00:01 GMT"]);
    std::fs::write(&path, jar).unwrap();

    assert_eq!(CookieFileStore::new(&path).get().unwrap(), None);
}

#[test]
fn file_store_corrupt_file_is_an_error() {
    let (_dir, path) = temp_jar();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{not json").unwrap();

    let store = CookieFileStore::new(&path);
    assert!(matches!(store.get(), Err(ClientError::InvalidJson(_))));
}

fn json_jar(cookies: &[&str]) -> String {
    serde_json::json!({ "cookies": cookies }).to_string()
}
