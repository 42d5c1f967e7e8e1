#![allow(clippy::disallowed_methods)]

use std::{fs, path::Path};

use gobundle::{
    BundleError, BundleOrchestrator, Config, ErrorCategory, parser::parse_source,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const HEADER: &str = "// Code generated by bundle generation tool; DO NOT EDIT.\n\npackage bundle\n";

const DAYS_BODY: &str = r#"// The code below has been bundled from "tests/fixtures/days.go" source file.
// Code generated by "stringer -type=Day -linecomment"; DO NOT EDIT.

type Day int

const (
	Monday Day = iota
	Tuesday
	Wednesday
	Thursday
	Friday
	Saturday
	Sunday
)

func (d Day) Print() string {
	return strconv.Itoa(int(d))
}
"#;

const ENUMS_BODY: &str = r#"// The code below has been bundled from "tests/fixtures/enums.go" source file.

type Level int

const (
	Low Level = iota << 2
	Medium
	High
)

func (l Level) Print() string {
	return strconv.Itoa(int(l))
}

func (l Level) Printf() (int, error) {
	return ftm.Printf("")
}

func (l Level) String() string {
	switch l {
	case Low:
		return "Low"
	case Medium:
		return "Medium"
	case High:
		return "High"
	default:
		return fmt.Sprintf("Level(%d)", l)
	}
}
"#;

const NUMBER_BODY: &str = r#"// The code below has been bundled from "tests/fixtures/number.go" source file.

func GetRandomNumber() int {
	return rand.Intn(1000)
}
"#;

fn config(package: &str, patterns: &[&str]) -> Config {
    Config {
        package: package.to_owned(),
        files: patterns.iter().map(|pattern| (*pattern).to_owned()).collect(),
        ..Default::default()
    }
}

fn bundle_to_string(config: &Config) -> Result<String, BundleError> {
    let mut out = Vec::new();
    BundleOrchestrator::new(config).bundle(&mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

fn expected(imports: &[&str], bodies: &[&str]) -> String {
    let mut out = format!("{HEADER}\nimport (\n");
    for import in imports {
        out.push_str(&format!("\t{import}\n"));
    }
    out.push_str(")\n");
    for body in bodies {
        out.push('\n');
        out.push_str(body);
    }
    out
}

#[test]
fn test_bundle_all_fixtures() {
    let output = bundle_to_string(&config("bundle", &["tests/fixtures/*.go"])).unwrap();
    assert_eq!(
        output,
        expected(
            &[r#""fmt""#, r#"ftm "fmt""#, r#""math/rand""#, r#""strconv""#],
            &[DAYS_BODY, ENUMS_BODY, NUMBER_BODY],
        )
    );
    insta::assert_snapshot!("all_fixtures", output);
}

#[test]
fn test_bundle_files_matching_pattern() {
    let output = bundle_to_string(&config("bundle", &["tests/fixtures/*s.go"])).unwrap();
    assert_eq!(
        output,
        expected(
            &[r#""fmt""#, r#"ftm "fmt""#, r#""strconv""#],
            &[DAYS_BODY, ENUMS_BODY],
        )
    );
}

#[test]
fn test_bundle_explicit_file_list() {
    let output = bundle_to_string(&config(
        "bundle",
        &["tests/fixtures/days.go", "tests/fixtures/number.go"],
    ))
    .unwrap();
    assert_eq!(
        output,
        expected(
            &[r#""math/rand""#, r#""strconv""#],
            &[DAYS_BODY, NUMBER_BODY]
        )
    );
}

#[test]
fn test_output_is_deterministic() {
    let config = config("bundle", &["tests/fixtures/*.go"]);
    let first = BundleOrchestrator::new(&config).build().unwrap();
    let second = BundleOrchestrator::new(&config).build().unwrap();
    assert_eq!(first, second);
    assert!(first.content.ends_with("}\n"));
    assert!(!first.content.ends_with("\n\n"));
}

#[test]
fn test_directory_argument_is_rejected() {
    let err = bundle_to_string(&config("badbundle", &["tests/fixtures"])).unwrap_err();
    assert!(matches!(err, BundleError::NotAFile { .. }));
    assert_eq!(err.category(), ErrorCategory::Resolution);
    assert_eq!(err.to_string(), "non-file \"tests/fixtures\" found in args");
}

#[test]
fn test_single_file_is_rejected() {
    let err = bundle_to_string(&config("badbundle", &["tests/fixtures/days.go"])).unwrap_err();
    assert!(matches!(err, BundleError::SingleFile { .. }));
    assert_eq!(err.category(), ErrorCategory::Cardinality);
}

#[test]
fn test_no_matches_is_rejected() {
    let err = bundle_to_string(&config("bundle", &["tests/fixtures/*.txt"])).unwrap_err();
    assert!(matches!(err, BundleError::NoFilesFound));
    assert_eq!(err.to_string(), "no files found in given path");
}

#[test]
fn test_nothing_is_written_on_error() {
    let mut out = Vec::new();
    let result =
        BundleOrchestrator::new(&config("bundle", &["tests/fixtures/days.go"])).bundle(&mut out);
    assert!(result.is_err());
    assert!(out.is_empty());
}

#[test]
fn test_aliased_and_plain_imports_of_one_path() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("a.go"),
        "package a\n\nimport \"fmt\"\n\ntype X struct{}\n\nvar _ = fmt.Sprint\n",
    )
    .unwrap();
    fs::write(
        tmp.path().join("b.go"),
        "package a\n\nimport (\n\tf2 \"fmt\"\n\t\"math/rand\"\n)\n\nfunc Y() int { f2.Println(); return rand.Int() }\n",
    )
    .unwrap();

    let a = tmp.path().join("a.go").display().to_string();
    let b = tmp.path().join("b.go").display().to_string();
    let output = bundle_to_string(&config("merged", &[&a, &b])).unwrap();

    assert_eq!(
        output,
        format!(
            "// Code generated by bundle generation tool; DO NOT EDIT.\n\n\
             package merged\n\n\
             import (\n\t\"fmt\"\n\tf2 \"fmt\"\n\t\"math/rand\"\n)\n\n\
             // The code below has been bundled from \"{a}\" source file.\n\n\
             type X struct{{}}\n\n\
             var _ = fmt.Sprint\n\n\
             // The code below has been bundled from \"{b}\" source file.\n\n\
             func Y() int {{ f2.Println(); return rand.Int() }}\n"
        )
    );
    assert_eq!(output.matches("package ").count(), 1);
    assert_eq!(output.matches("import (").count(), 1);
}

#[test]
fn test_comments_next_to_package_clause_stay_detached() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("a.go"),
        "package a\n// T is a number.\ntype T int\n",
    )
    .unwrap();
    fs::write(
        tmp.path().join("b.go"),
        "// Package a does things.\npackage a\nfunc F() {}\n",
    )
    .unwrap();

    let a = tmp.path().join("a.go").display().to_string();
    let b = tmp.path().join("b.go").display().to_string();
    let output = bundle_to_string(&config("merged", &[&a, &b])).unwrap();

    assert_eq!(
        output,
        format!(
            "// Code generated by bundle generation tool; DO NOT EDIT.\n\n\
             package merged\n\n\
             // The code below has been bundled from \"{a}\" source file.\n\n\
             // T is a number.\n\
             type T int\n\n\
             // The code below has been bundled from \"{b}\" source file.\n\
             // Package a does things.\n\n\
             func F() {{}}\n"
        )
    );
}

#[test]
fn test_bundle_output_can_be_bundled_again() {
    let tmp = TempDir::new().unwrap();
    let first = BundleOrchestrator::new(&config("bundle", &["tests/fixtures/*.go"]))
        .build()
        .unwrap();
    fs::write(tmp.path().join("bundle.go"), &first.content).unwrap();
    fs::write(
        tmp.path().join("extra.go"),
        "package bundle\n\nimport \"os\"\n\nfunc Args() []string {\n\treturn os.Args\n}\n",
    )
    .unwrap();

    let pattern = tmp.path().join("*.go").display().to_string();
    let second = BundleOrchestrator::new(&config("bundle", &[&pattern]))
        .build()
        .unwrap();

    let unit = parse_source(Path::new("again.go"), &second.content).unwrap();
    assert_eq!(unit.package_name(), "bundle");
    assert_eq!(unit.imports().len(), 5);
    assert!(second.content.contains("func Args() []string {\n\treturn os.Args\n}\n"));
    assert!(second.content.contains(DAYS_BODY));
}

fn copy_fixtures(dir: &Path) -> String {
    for name in ["days.go", "number.go"] {
        fs::copy(Path::new("tests/fixtures").join(name), dir.join(name)).unwrap();
    }
    dir.join("*.go").display().to_string()
}

#[test]
fn test_sources_are_deleted_when_enabled() {
    let tmp = TempDir::new().unwrap();
    let pattern = copy_fixtures(tmp.path());
    let config = Config {
        delete_sources: true,
        ..config("bundle", &[&pattern])
    };

    let output = bundle_to_string(&config).unwrap();
    assert!(output.contains("func GetRandomNumber() int {"));
    assert!(!tmp.path().join("days.go").exists());
    assert!(!tmp.path().join("number.go").exists());
}

#[test]
fn test_sources_are_kept_by_default() {
    let tmp = TempDir::new().unwrap();
    let pattern = copy_fixtures(tmp.path());

    bundle_to_string(&config("bundle", &[&pattern])).unwrap();
    assert!(tmp.path().join("days.go").exists());
    assert!(tmp.path().join("number.go").exists());
}

#[test]
fn test_sources_are_kept_on_parse_failure() {
    let tmp = TempDir::new().unwrap();
    let pattern = copy_fixtures(tmp.path());
    fs::write(tmp.path().join("zz_broken.go"), "package bundle\n\nfunc (\n").unwrap();
    let config = Config {
        delete_sources: true,
        ..config("bundle", &[&pattern])
    };

    let err = bundle_to_string(&config).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Parse);
    assert!(err.to_string().contains("zz_broken.go:"));
    assert!(tmp.path().join("days.go").exists());
    assert!(tmp.path().join("number.go").exists());
}
