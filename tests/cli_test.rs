use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

fn round_trip_test(test_data: &[u8],max_bits: &str) -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("expanded");
    let cmp_path = temp_dir.path().join("compressed");
    let out_path = temp_dir.path().join("recovered");
    std::fs::write(&in_path,test_data)?;
    let mut cmd = Command::cargo_bin("ablzw")?;
    cmd.arg("compress")
        .arg("-x").arg(max_bits)
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&cmp_path)
        .assert()
        .success();
    let mut cmd = Command::cargo_bin("ablzw")?;
    cmd.arg("expand")
        .arg("-i").arg(&cmp_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success();
    match (std::fs::read(&in_path),std::fs::read(&out_path)) {
        (Ok(v1),Ok(v2)) => {
            assert_eq!(v1,v2);
        },
        _ => panic!("unable to compare output with original")
    }
    Ok(())
}

#[test]
fn text_round_trip() -> STDRESULT {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".repeat(100);
    round_trip_test(test_data.as_bytes(),"12")?;
    round_trip_test(test_data.as_bytes(),"9")
}

#[test]
fn binary_round_trip() -> STDRESULT {
    let test_data: Vec<u8> = (0u32..4096).map(|i| (i*i % 251) as u8).collect();
    round_trip_test(&test_data,"16")
}

#[test]
fn empty_round_trip() -> STDRESULT {
    round_trip_test(&[],"9")
}

#[test]
fn rejects_out_of_range_width() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("expanded");
    let cmp_path = temp_dir.path().join("compressed");
    std::fs::write(&in_path,b"some bytes")?;
    let mut cmd = Command::cargo_bin("ablzw")?;
    cmd.arg("compress")
        .arg("-x").arg("20")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&cmp_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
    Ok(())
}

#[test]
fn rejects_corrupt_header() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let cmp_path = temp_dir.path().join("compressed");
    let out_path = temp_dir.path().join("recovered");
    std::fs::write(&cmp_path,[0x02,0xff,0x01])?;
    let mut cmd = Command::cargo_bin("ablzw")?;
    cmd.arg("expand")
        .arg("-i").arg(&cmp_path)
        .arg("-o").arg(&out_path)
        .assert()
        .failure();
    Ok(())
}
