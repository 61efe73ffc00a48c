//! # gtcedit
//!
//! Bulk editing of binary genotype call (GTC) records against a probe
//! manifest.
//!
//! An update script names, per output record, a source record, an output
//! name, optional scalar metadata assignments, and any number of SNP
//! edits. Each edit is resolved against the marker's manifest definition
//! (forward-strand allele pair, strand orientation, indel-vs-SNP type)
//! into a genotype code and 2-character base call; everything the script
//! does not touch round-trips byte-identically. Every output record is
//! re-decoded and validated against its source, advisorily.
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//! use gtcedit::{Blocks, Driver, EventLog, Manifest};
//!
//! fn main() -> gtcedit::Result<()> {
//!     let manifest = Manifest::from_paths("assay.bpm", "assay.csv")?;
//!     let script = File::open("updates.txt").map(BufReader::new)?;
//!     let mut events = EventLog::new();
//!     let driver = Driver::new(&manifest, "gtc/", "out/");
//!     let summary = driver.run(Blocks::new(script), &mut events)?;
//!     println!("{} records written", summary.written);
//!     Ok(())
//! }
//! ```

mod edit;
mod error;
mod events;
mod gtc;
mod manifest;
mod script;
mod validate;

pub use edit::{
    apply_assignments, resolve, BatchOutcome, CancelToken, Driver, MetadataField, ResolvedCall,
    RunSummary,
};
pub use error::{
    ConfigError, EditError, Error, ManifestError, RecordError, Result, ScriptError,
};
pub use events::{Event, EventLog, Severity};
pub use gtc::{field_id, field_kind, FieldKind, FieldValue, GenotypeCode, GtcRecord, NO_CALL_BASES};
pub use manifest::{
    complement, BpmEntry, BpmManifest, CsvEntry, CsvManifest, Manifest, Marker, OverrideSet,
    RefStrand, SnpString, NO_CALL_ALLELE,
};
pub use script::{Block, Blocks, SnpEdit};
pub use validate::{validate, Mismatch, ValidationReport};

#[cfg(test)]
mod testing {

    use super::*;
    use anyhow::Result;
    use std::fs;

    fn manifest() -> Manifest {
        Manifest::new(vec![
            Marker {
                name: "rs100".to_string(),
                snp_string: SnpString::parse("A/G").unwrap(),
                ref_strand: RefStrand::Plus,
                csv_alleles: Some([b'A', b'G']),
            },
            Marker {
                name: "rs200".to_string(),
                snp_string: SnpString::parse("T/C").unwrap(),
                ref_strand: RefStrand::Minus,
                csv_alleles: Some([b'A', b'G']),
            },
            Marker {
                name: "indel300".to_string(),
                snp_string: SnpString::parse("I/D").unwrap(),
                ref_strand: RefStrand::Plus,
                csv_alleles: None,
            },
        ])
    }

    fn record() -> GtcRecord {
        let mut record = GtcRecord::new();
        record.insert(field_id::NUM_SNPS, FieldValue::U32(3));
        record.insert(field_id::SAMPLE_NAME, FieldValue::Str("NA12878".into()));
        record.insert(field_id::SAMPLE_PLATE, FieldValue::Str("plate1".into()));
        record.insert(field_id::SAMPLE_WELL, FieldValue::Str("A01".into()));
        record.insert(field_id::CLUSTER_FILE, FieldValue::Str("assay.egt".into()));
        record.insert(field_id::AUTOCALL_DATE, FieldValue::Str("2/14/2024".into()));
        record.insert(field_id::AUTOCALL_VERSION, FieldValue::Str("3.0.0".into()));
        record.insert(field_id::GENDER, FieldValue::Str("F".into()));
        record.insert(field_id::SENTRIX_BARCODE, FieldValue::Str("203954".into()));
        record.insert(field_id::CONTROLS_X, FieldValue::U16Array(vec![5, 10, 15]));
        record.insert(field_id::CONTROLS_Y, FieldValue::U16Array(vec![6, 11, 16]));
        record.insert(field_id::RAW_X, FieldValue::U16Array(vec![100, 200, 300]));
        record.insert(field_id::RAW_Y, FieldValue::U16Array(vec![110, 210, 310]));
        record.insert(field_id::GENOTYPES, FieldValue::U8Array(vec![1, 2, 0]));
        record.insert(
            field_id::BASE_CALLS,
            FieldValue::CallArray(vec![*b"AA", *b"AG", *b"--"]),
        );
        record.insert(
            field_id::GENOTYPE_SCORES,
            FieldValue::F32Array(vec![0.91, 0.84, 0.0]),
        );
        record.insert(
            field_id::LOGR_RATIOS,
            FieldValue::F32Array(vec![0.1, -0.2, 0.0]),
        );
        record.insert(
            field_id::B_ALLELE_FREQS,
            FieldValue::F32Array(vec![0.0, 0.5, 0.5]),
        );
        record.insert(
            field_id::PERCENTILES_X,
            FieldValue::U16Triple([120, 480, 960]),
        );
        record
    }

    #[test]
    fn end_to_end_run() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let gtc_dir = dir.path().join("gtc");
        let out_dir = dir.path().join("out");
        fs::create_dir(&gtc_dir)?;
        fs::create_dir(&out_dir)?;

        record().write_path(gtc_dir.join("sample.gtc"))?;

        let script = "\
>sample.gtc edited sampleName=renamed,well=B02
rs100\tGG
rs200\tAG
";
        let manifest = manifest();
        let mut events = EventLog::quiet();
        let driver = Driver::new(&manifest, &gtc_dir, &out_dir);
        let summary = driver.run(Blocks::new(script.as_bytes()), &mut events)?;

        assert_eq!(summary.written, 1);
        assert_eq!(summary.aborted, 0);
        assert_eq!(summary.validation_failures, 0);

        let output = GtcRecord::from_path(out_dir.join("edited.gtc"))?;
        assert_eq!(output.sample_name()?, "renamed");
        assert_eq!(output.sample_well()?, "B02");
        assert_eq!(output.genotypes()?, &[3, 2, 0]);
        assert_eq!(output.base_calls()?[0], *b"GG");
        assert_eq!(output.base_calls()?[1], *b"AG");
        // untouched fields stay byte-identical to the source
        assert_eq!(output.raw_x()?, record().raw_x()?);
        assert_eq!(output.genotype_scores()?, record().genotype_scores()?);
        Ok(())
    }

    #[test]
    fn metadata_only_block_passes_validation() -> Result<()> {
        let dir = tempfile::tempdir()?;
        record().write_path(dir.path().join("sample.gtc"))?;

        let script = ">sample.gtc copy sampleName=renamed\n";
        let manifest = manifest();
        let mut events = EventLog::quiet();
        let driver = Driver::new(&manifest, dir.path(), dir.path());
        let summary = driver.run(Blocks::new(script.as_bytes()), &mut events)?;

        assert_eq!(summary.written, 1);
        assert_eq!(summary.validation_failures, 0);
        Ok(())
    }

    #[test]
    fn unknown_marker_aborts_only_its_batch() -> Result<()> {
        let dir = tempfile::tempdir()?;
        record().write_path(dir.path().join("sample.gtc"))?;

        let script = "\
>sample.gtc bad
rs999\tAA
>sample.gtc good
rs100\tAA
";
        let manifest = manifest();
        let mut events = EventLog::quiet();
        let driver = Driver::new(&manifest, dir.path(), dir.path());
        let summary = driver.run(Blocks::new(script.as_bytes()), &mut events)?;

        assert_eq!(summary.aborted, 1);
        assert_eq!(summary.written, 1);
        assert!(!dir.path().join("bad.gtc").exists());
        assert!(dir.path().join("good.gtc").exists());
        Ok(())
    }

    #[test]
    fn unresolvable_pair_aborts_only_its_batch() -> Result<()> {
        let dir = tempfile::tempdir()?;
        record().write_path(dir.path().join("sample.gtc"))?;

        let script = "\
>sample.gtc bad
rs100\tKK
>sample.gtc good
rs100\tGG
";
        let manifest = manifest();
        let mut events = EventLog::quiet();
        let driver = Driver::new(&manifest, dir.path(), dir.path());
        let summary = driver.run(Blocks::new(script.as_bytes()), &mut events)?;

        assert_eq!(summary.aborted, 1);
        assert_eq!(summary.written, 1);
        assert!(!dir.path().join("bad.gtc").exists());
        Ok(())
    }

    #[test]
    fn indel_edit_writes_sentinel_base_calls() -> Result<()> {
        let dir = tempfile::tempdir()?;
        record().write_path(dir.path().join("sample.gtc"))?;

        let script = ">sample.gtc edited\nindel300\tDD\n";
        let manifest = manifest();
        let mut events = EventLog::quiet();
        let driver = Driver::new(&manifest, dir.path(), dir.path());
        let summary = driver.run(Blocks::new(script.as_bytes()), &mut events)?;
        assert_eq!(summary.written, 1);

        let output = GtcRecord::from_path(dir.path().join("edited.gtc"))?;
        assert_eq!(output.genotypes()?[2], 3);
        assert_eq!(output.base_calls()?[2], *b"DD");
        // the no-call count changed, so the advisory validation flags it
        assert_eq!(summary.validation_failures, 1);
        Ok(())
    }

    #[test]
    fn idempotent_edit_applied_twice_in_one_block() -> Result<()> {
        let dir = tempfile::tempdir()?;
        record().write_path(dir.path().join("sample.gtc"))?;

        let script = ">sample.gtc twice\nrs100\tGG\nrs100\tGG\n";
        let manifest = manifest();
        let mut events = EventLog::quiet();
        let driver = Driver::new(&manifest, dir.path(), dir.path());
        driver.run(Blocks::new(script.as_bytes()), &mut events)?;

        let output = GtcRecord::from_path(dir.path().join("twice.gtc"))?;
        assert_eq!(output.genotypes()?[0], 3);
        assert_eq!(output.base_calls()?[0], *b"GG");
        Ok(())
    }

    #[test]
    fn overrides_change_classification_for_the_run() -> Result<()> {
        let dir = tempfile::tempdir()?;
        record().write_path(dir.path().join("sample.gtc"))?;

        // rs200 is stated T/C on the Minus strand (resolved A/G), so a
        // (C, C) request normally classifies homozygous-alternate; with
        // the definition overridden to C/T (resolved G/A) the same
        // request classifies homozygous-reference via its complement
        let mut events = EventLog::quiet();
        let overrides = OverrideSet::from_reader("rs200\tC/T\n".as_bytes(), &mut events)?;
        let manifest = manifest().with_overrides(&overrides, &mut events);

        let script = ">sample.gtc edited\nrs200\tCC\n";
        let driver = Driver::new(&manifest, dir.path(), dir.path());
        let summary = driver.run(Blocks::new(script.as_bytes()), &mut events)?;
        assert_eq!(summary.written, 1);

        let output = GtcRecord::from_path(dir.path().join("edited.gtc"))?;
        assert_eq!(output.genotypes()?[1], 1);
        assert_eq!(output.base_calls()?[1], *b"AA");
        Ok(())
    }

    #[test]
    fn parallel_run_matches_sequential_counts() -> Result<()> {
        let dir = tempfile::tempdir()?;
        record().write_path(dir.path().join("sample.gtc"))?;

        let script = "\
>sample.gtc outA
rs100\tGG
>sample.gtc outB
rs200\tGG
>sample.gtc outC
rs999\tAA
";
        let manifest = manifest();
        let mut events = EventLog::quiet();
        let driver = Driver::new(&manifest, dir.path(), dir.path()).threads(2);
        let summary = driver.run(Blocks::new(script.as_bytes()), &mut events)?;

        assert_eq!(summary.written, 2);
        assert_eq!(summary.aborted, 1);
        assert!(dir.path().join("outA.gtc").exists());
        assert!(dir.path().join("outB.gtc").exists());
        assert!(!dir.path().join("outC.gtc").exists());
        Ok(())
    }

    #[test]
    fn cancelled_run_stops_between_batches() -> Result<()> {
        let dir = tempfile::tempdir()?;
        record().write_path(dir.path().join("sample.gtc"))?;

        let script = ">sample.gtc outA\n>sample.gtc outB\n";
        let manifest = manifest();
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut events = EventLog::quiet();
        let driver = Driver::new(&manifest, dir.path(), dir.path()).cancel_token(cancel);
        let summary = driver.run(Blocks::new(script.as_bytes()), &mut events)?;

        assert_eq!(summary.written, 0);
        assert!(summary.cancelled);
        Ok(())
    }
}
