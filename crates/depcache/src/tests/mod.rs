use crate::record::*;
use crate::lock::{lock_path, take_over, CacheLock, RetryPolicy};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn import_text_is_split_into_dir_and_leaf() {
    assert_eq!(
        import_target("import java.util.List;"),
        Some(("java/util/".into(), "List".into()))
    );
    assert_eq!(
        import_target("  import   pkg.sub.Thing ;\n"),
        Some(("pkg/sub/".into(), "Thing".into()))
    );
    assert_eq!(
        import_target("import static pkg.Util.helper;"),
        Some(("pkg/Util/".into(), "helper".into()))
    );
    assert_eq!(
        import_target("import java.util.*;"),
        Some(("java/util/".into(), "*".into()))
    );
    assert_eq!(import_target("import Lonely;"), None);
}

#[test]
fn record_line_layout() {
    let imports = vec!["import java.util.List;".to_string(), "import Lonely;".to_string()];
    let rec = DependencyRecord::from_imports("/src/A.java", &imports, Path::new("/nonexistent-root"), 42)
        .unwrap();
    assert_eq!(rec.parse_time, rec.check_time);
    assert_eq!(rec.to_line(), "/src/A.java|42;42;java/util/;List.java;");
}

#[test]
fn no_imports_means_no_record() {
    assert!(DependencyRecord::from_imports("/src/A.java", &[], Path::new("/"), 1).is_none());
}

#[test]
fn existing_root_dirs_become_root_prefixed() {
    let tmp = tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("pkg").join("sub")).unwrap();
    let imports = vec![
        "import pkg.sub.Thing;".to_string(),
        "import java.util.Map;".to_string(),
    ];
    let rec = DependencyRecord::from_imports("/src/A.java", &imports, tmp.path(), 7).unwrap();
    let root = tmp.path().to_string_lossy().into_owned();
    assert_eq!(rec.imports[0].dir, format!("{root}/pkg/sub/"));
    assert_eq!(rec.imports[0].file, "Thing.java");
    assert_eq!(rec.imports[1].dir, "java/util/");
}

#[test]
fn parse_accepts_written_lines() {
    let rec = DependencyRecord::parse("/src/A.java|10;10;pkg/;B.java;java/util/;List.java;").unwrap();
    assert_eq!(rec.path, "/src/A.java");
    assert_eq!(rec.parse_time, 10);
    assert_eq!(rec.imports.len(), 2);
    assert_eq!(rec.imports[1].file, "List.java");
    assert_eq!(record_key("/src/A.java|10;10;"), Some("/src/A.java"));
}

#[test]
fn parse_rejects_malformed_lines() {
    assert!(DependencyRecord::parse("no bar here").is_none());
    assert!(DependencyRecord::parse("/a|1;").is_none());
    assert!(DependencyRecord::parse("/a|1;1;pkg/;").is_none());
    assert!(DependencyRecord::parse("/a|x;1;").is_none());
}

#[test]
fn lock_is_released_on_drop() {
    let tmp = tempdir().unwrap();
    let cache = tmp.path().join("incdeps.txt");
    let policy = RetryPolicy::default();
    {
        let lock = CacheLock::acquire(&cache, &policy).unwrap().unwrap();
        assert!(lock.path().exists());
    }
    assert!(!lock_path(&cache).exists());
}

#[test]
fn held_lock_exhausts_retries() {
    let tmp = tempdir().unwrap();
    let cache = tmp.path().join("incdeps.txt");
    let policy = RetryPolicy {
        attempts: 3,
        delay: Duration::from_millis(1),
        stale_after: Duration::from_secs(3600),
    };
    let _held = CacheLock::acquire(&cache, &policy).unwrap().unwrap();
    assert!(CacheLock::acquire(&cache, &policy).unwrap().is_none());
}

#[test]
fn stale_lock_is_broken() {
    let tmp = tempdir().unwrap();
    let cache = tmp.path().join("incdeps.txt");
    fs::write(lock_path(&cache), "999999\n").unwrap();
    std::thread::sleep(Duration::from_millis(20));
    let policy = RetryPolicy {
        attempts: 3,
        delay: Duration::from_millis(1),
        stale_after: Duration::from_millis(5),
    };
    assert!(CacheLock::acquire(&cache, &policy).unwrap().is_some());
}

#[test]
fn lock_file_holds_owner_token() {
    let tmp = tempdir().unwrap();
    let cache = tmp.path().join("incdeps.txt");
    let first = CacheLock::acquire(&cache, &RetryPolicy::default()).unwrap().unwrap();
    assert_eq!(fs::read_to_string(first.path()).unwrap(), first.token());
    let token = first.token().to_string();
    drop(first);
    let second = CacheLock::acquire(&cache, &RetryPolicy::default()).unwrap().unwrap();
    assert_ne!(second.token(), token);
}

#[test]
fn drop_leaves_successor_lock_in_place() {
    let tmp = tempdir().unwrap();
    let cache = tmp.path().join("incdeps.txt");
    let lock = CacheLock::acquire(&cache, &RetryPolicy::default()).unwrap().unwrap();
    fs::write(lock_path(&cache), "4242 1 0").unwrap();
    drop(lock);
    assert_eq!(fs::read_to_string(lock_path(&cache)).unwrap(), "4242 1 0");
}

#[test]
fn takeover_restores_a_replaced_lock() {
    let tmp = tempdir().unwrap();
    let path = lock_path(&tmp.path().join("incdeps.txt"));
    fs::write(&path, "4242 2 0").unwrap();
    assert!(!take_over(&path, "999999\n"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "4242 2 0");
    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
}

#[test]
fn takeover_removes_the_seen_lock() {
    let tmp = tempdir().unwrap();
    let path = lock_path(&tmp.path().join("incdeps.txt"));
    fs::write(&path, "999999\n").unwrap();
    assert!(take_over(&path, "999999\n"));
    assert!(!path.exists());
    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[test]
fn takeover_of_a_missing_lock_claims_nothing() {
    let tmp = tempdir().unwrap();
    let path = lock_path(&tmp.path().join("incdeps.txt"));
    assert!(!take_over(&path, "999999\n"));
    assert!(!path.exists());
}
