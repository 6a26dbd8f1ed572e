use anyhow::Result;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn atsep(home: &Path, args: &[&str]) -> Result<Output> {
    // Point config lookup at an empty home so a developer's rc file and key stay out.
    let output = Command::new(env!("CARGO_BIN_EXE_atsep"))
        .args(args)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("GEMINI_API_KEY")
        .env_remove("RUST_LOG")
        .env_remove("MANUALS_DIR")
        .env_remove("ROSTER_CSV")
        .output()?;
    Ok(output)
}

fn stdout(o: &Output) -> String {
    String::from_utf8_lossy(&o.stdout).into_owned()
}

#[test]
fn test_roster_prints_joined_columns_and_exports() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let csv = tmp.path().join("Personal CNSE Nacional.csv");
    fs::write(
        &csv,
        " ID ,Nombres,Apellidos, Cargo ,Aeropuerto\n\
         1,Ana,Paz,Técnico,EZE\n\
         2,Luis,Gil,Supervisor,AEP\n\
         3,Eva,Sol,Técnico,COR\n",
    )?;
    let out = tmp.path().join("out");

    let o = atsep(tmp.path(), &["roster", csv.to_str().unwrap(), "--out-dir", out.to_str().unwrap()])?;
    assert!(o.status.success(), "stderr: {}", String::from_utf8_lossy(&o.stderr));
    let text = stdout(&o);
    assert!(text.contains(r#"["id_x", "nombre_x", "apellido", "cargo_completo", "id_y", "nombre_y"]"#), "{text}");
    assert!(text.contains("3 persons, 2 distinct positions"), "{text}");

    let puestos = fs::read_to_string(out.join("puestos.csv"))?;
    assert_eq!(puestos, "id,nombre\n1,Supervisor\n2,Técnico\n");
    let personal = fs::read_to_string(out.join("personal.csv"))?;
    assert_eq!(personal.lines().count(), 4);
    assert!(personal.contains("3,Eva,Sol,2"));
    Ok(())
}

#[test]
fn test_roster_missing_column_fails() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let csv = tmp.path().join("roster.csv");
    fs::write(&csv, "id,nombres,apellidos\n1,Ana,Paz\n")?;

    let o = atsep(tmp.path(), &["roster", csv.to_str().unwrap()])?;
    assert!(!o.status.success());
    let err = String::from_utf8_lossy(&o.stderr);
    assert!(err.contains("missing column 'cargo'"), "{err}");
    Ok(())
}

#[test]
fn test_manuals_creates_missing_folder() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let folder = tmp.path().join("manuals");

    let o = atsep(tmp.path(), &["manuals", "--dir", folder.to_str().unwrap()])?;
    assert!(o.status.success(), "stderr: {}", String::from_utf8_lossy(&o.stderr));
    assert!(folder.is_dir());
    let text = stdout(&o);
    assert!(text.contains("GEMINI_API_KEY not found"), "{text}");
    assert!(text.contains("No manuals were uploaded"), "{text}");
    Ok(())
}

#[test]
fn test_manuals_without_key_isolates_each_file() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let folder = tmp.path().join("manuals");
    fs::create_dir(&folder)?;
    fs::write(folder.join("vor.pdf"), b"%PDF-1.4")?;
    fs::write(folder.join("ils.PDF"), b"%PDF-1.4")?;
    fs::write(folder.join("notes.txt"), b"not a manual")?;

    let o = atsep(tmp.path(), &["manuals", "--dir", folder.to_str().unwrap()])?;
    assert!(o.status.success(), "stderr: {}", String::from_utf8_lossy(&o.stderr));
    let text = stdout(&o);
    assert_eq!(text.matches("GEMINI_API_KEY is not configured").count(), 2, "{text}");
    assert!(text.contains("Uploading: ils.PDF"), "{text}");
    assert!(!text.contains("notes.txt"), "{text}");
    assert!(text.contains("No manuals were uploaded"), "{text}");
    Ok(())
}
