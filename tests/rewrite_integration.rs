use serde_json::Value;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn write_file(path: &Path, content: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn class_bytes(body: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x34, 0x00, 0x01];
    bytes.extend_from_slice(body);
    bytes
}

fn write_jar(path: &Path, entries: &[(&str, &[u8])]) -> anyhow::Result<()> {
    use zip::write::FileOptions;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in entries {
        zip.start_file(*name, options)?;
        zip.write_all(content)?;
    }
    zip.finish()?;
    Ok(())
}

fn read_jar_entry(path: &Path, name: &str) -> anyhow::Result<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(std::fs::File::open(path)?)?;
    let mut entry = archive.by_name(name)?;
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf)?;
    Ok(buf)
}

fn set_old_mtime(path: &Path) -> anyhow::Result<()> {
    filetime::set_file_mtime(path, filetime::FileTime::from_unix_time(1_000_000_000, 0))?;
    Ok(())
}

fn run(args: &[&str]) -> anyhow::Result<Output> {
    let bin = env!("CARGO_BIN_EXE_class-rewriter");
    Ok(Command::new(bin)
        .args(args)
        .env_remove("CLASS_REWRITER_MODE")
        .env_remove("CLASS_REWRITER_AGENT")
        .env_remove("RUST_LOG")
        .output()?)
}

fn run_json(args: &[&str]) -> anyhow::Result<Value> {
    let out = run(args)?;
    if !out.status.success() {
        return Err(anyhow::anyhow!(
            "command failed: status={:?}, stderr={}",
            out.status.code(),
            String::from_utf8_lossy(&out.stderr)
        ));
    }
    Ok(serde_json::from_slice(&out.stdout)?)
}

fn roots() -> anyhow::Result<(tempfile::TempDir, PathBuf, PathBuf)> {
    let base = tempfile::tempdir()?;
    let src = base.path().join("classes");
    let dst = base.path().join("woven");
    std::fs::create_dir_all(&src)?;
    std::fs::create_dir_all(&dst)?;
    Ok((base, src, dst))
}

fn s(p: &Path) -> String {
    p.to_string_lossy().to_string()
}

#[test]
fn rewrites_tree_then_skips_up_to_date_outputs() -> anyhow::Result<()> {
    let (_base, src, dst) = roots()?;
    let foo = class_bytes(&[7u8; 90]);
    let bar = class_bytes(b"bar");
    let manifest = b"Manifest-Version: 1.0\r\n\r\n".to_vec();
    write_file(&src.join("a/Foo.class"), &foo)?;
    write_jar(
        &src.join("a/lib.jar"),
        &[("Bar.class", &bar), ("META-INF/MANIFEST.MF", &manifest)],
    )?;
    write_file(&src.join("a/notes.txt"), b"notes")?;
    for p in ["a/Foo.class", "a/lib.jar", "a/notes.txt"] {
        set_old_mtime(&src.join(p))?;
    }

    let args = ["--src-dir", &s(&src), "--dest-dir", &s(&dst), "--mode", "ASM"];
    let first = run_json(&args)?;
    assert_eq!(first["matched"], Value::from(3));
    assert_eq!(first["rewritten_classes"], Value::from(1));
    assert_eq!(first["rewritten_archives"], Value::from(1));
    assert_eq!(first["transformed_entries"], Value::from(1));
    assert_eq!(first["copied_entries"], Value::from(1));
    assert_eq!(first["ignored"], Value::from(1));

    assert_eq!(std::fs::read(dst.join("a/Foo.class"))?, foo);
    assert_eq!(read_jar_entry(&dst.join("a/lib.jar"), "Bar.class")?, bar);
    assert_eq!(
        class_rewriter::archive::entry_names(&dst.join("a/lib.jar"))?,
        vec!["Bar.class".to_string(), "META-INF/MANIFEST.MF".to_string()]
    );
    assert!(!dst.join("a/notes.txt").exists());

    let second = run_json(&args)?;
    assert_eq!(second["skipped_up_to_date"], Value::from(2));
    assert_eq!(second["rewritten_classes"], Value::from(0));
    assert_eq!(second["rewritten_archives"], Value::from(0));
    Ok(())
}

#[cfg(unix)]
#[test]
fn agent_output_lands_in_classes_and_archives() -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let (base, src, dst) = roots()?;
    let agent = base.path().join("bin/weave.sh");
    write_file(&agent, b"#!/bin/sh\ncat\nprintf 'WOVEN'\n")?;
    let mut perms = std::fs::metadata(&agent)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&agent, perms)?;

    let foo = class_bytes(b"foo");
    write_file(&src.join("Foo.class"), &foo)?;
    write_jar(
        &src.join("app.war"),
        &[
            ("WEB-INF/classes/Bar.class", &class_bytes(b"bar")),
            ("index.html", b"<html></html>"),
        ],
    )?;

    let summary = run_json(&[
        "--src-dir",
        &s(&src),
        "--dest-dir",
        &s(&dst),
        "--agent",
        &s(&agent),
        "--include",
        "**/*.class",
        "--include",
        "**/*.war",
    ])?;
    assert_eq!(summary["matched"], Value::from(2));

    let mut expected = foo.clone();
    expected.extend_from_slice(b"WOVEN");
    assert_eq!(std::fs::read(dst.join("Foo.class"))?, expected);

    let woven = read_jar_entry(&dst.join("app.war"), "WEB-INF/classes/Bar.class")?;
    assert!(woven.ends_with(b"WOVEN"));
    assert_eq!(
        read_jar_entry(&dst.join("app.war"), "index.html")?,
        b"<html></html>"
    );
    Ok(())
}

#[test]
fn explicit_paths_limit_the_pass() -> anyhow::Result<()> {
    let (_base, src, dst) = roots()?;
    write_file(&src.join("a/One.class"), &class_bytes(b"1"))?;
    write_file(&src.join("a/Two.class"), &class_bytes(b"2"))?;

    let summary = run_json(&[
        "--src-dir",
        &s(&src),
        "--dest-dir",
        &s(&dst),
        "a/Two.class",
    ])?;
    assert_eq!(summary["matched"], Value::from(1));
    assert!(dst.join("a/Two.class").exists());
    assert!(!dst.join("a/One.class").exists());
    Ok(())
}

#[test]
fn unknown_mode_fails_before_touching_files() -> anyhow::Result<()> {
    let (_base, src, dst) = roots()?;
    write_file(&src.join("a/Foo.class"), &class_bytes(b""))?;

    let out = run(&["--src-dir", &s(&src), "--dest-dir", &s(&dst), "--mode", "bogus"])?;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unrecognized transformer: bogus"));
    assert_eq!(std::fs::read_dir(&dst)?.count(), 0);
    Ok(())
}

#[test]
fn missing_source_dir_is_reported() -> anyhow::Result<()> {
    let (base, _src, dst) = roots()?;
    let missing = base.path().join("missing");

    let out = run(&["--src-dir", &s(&missing), "--dest-dir", &s(&dst)])?;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("does not exist"));

    let out = run(&["--dest-dir", &s(&dst)])?;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("no source directory is specified"));
    Ok(())
}

#[test]
fn corrupt_archive_aborts_without_leaving_output() -> anyhow::Result<()> {
    let (_base, src, dst) = roots()?;
    write_file(&src.join("lib/broken.jar"), b"PK\x03\x04 truncated")?;

    let out = run(&["--src-dir", &s(&src), "--dest-dir", &s(&dst)])?;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("broken.jar"));
    assert!(!dst.join("lib/broken.jar").exists());
    assert_eq!(std::fs::read_dir(dst.join("lib"))?.count(), 0);
    Ok(())
}
