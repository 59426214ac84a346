//! Benchmarks for the validation engine.

use std::fmt::Write as _;
use std::io::Write as _;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tempfile::NamedTempFile;

use sheetcheck::{RuleSet, Validator};

const RULES: &str = r#"{
    "required_sections": ["Header", "Reads", "Settings", "Data"],
    "required_fields": {
        "Header": ["Date", "Investigator Name"],
        "Data": ["Sample_ID", "Sample_Name"]
    },
    "allowed_characters": {
        "Sample_ID": {"pattern": "a-zA-Z0-9\\-_", "description": "letters, digits, hyphen, underscore"}
    },
    "pipelines": {
        "FLT3-ITD": {"type": "keyword", "keywords": ["FLT3-ITD"], "fuzzy": true, "description_check": true},
        "NPM1": {"type": "keyword", "keywords": ["NPM1"], "fuzzy": true, "description_check": true},
        "COVID": {"type": "regex", "sample_id_regex": "D[A-Z]2[0-4]\\d{6}"}
    }
}"#;

fn build_sheet(samples: usize) -> String {
    let mut sheet = String::from(
        "[Header]\nIEMFileVersion,4\nDate,2024-01-05\nInvestigator Name,LJ\n\
         [Reads]\n151\n151\n[Settings]\nAdapter,CTGTCTCTTATACACATCT\n\
         [Data]\nSample_ID,Sample_Name,Description,index,index2\n",
    );
    for i in 0..samples {
        let description = match i % 3 {
            0 => "FLT3-ITD",
            1 => "NPM1",
            _ => "flt3itd",
        };
        let _ = writeln!(
            sheet,
            "S{i:04},S{i:04},{description},ATTACTCG,TATAGCCT"
        );
    }
    sheet
}

fn bench_validate(c: &mut Criterion) {
    let rules = RuleSet::from_json(RULES).expect("rules compile");
    let engine = Validator::new(rules);

    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(build_sheet(200).as_bytes()).expect("write sheet");

    c.bench_function("validate_200_samples", |b| {
        b.iter(|| black_box(engine.validate_file(file.path())))
    });
}

criterion_group!(benches, bench_validate);
criterion_main!(benches);
