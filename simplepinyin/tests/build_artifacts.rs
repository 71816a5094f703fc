// Building lexicon artifacts from a phrase table and opening a context the
// way the command line does.

use std::path::{Path, PathBuf};

use simplepinyin::{build_artifacts, Context, Error, PinyinConfig};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "simplepinyin_build_test_{}_{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_table(dir: &Path) -> PathBuf {
    let table = dir.join("phrases.txt");
    std::fs::write(
        &table,
        "ni'hao\t你好\t1\t10\nni\t你\t2\t5\nhao\t好\t3\t5\nzhong'guo 中国 8\n",
    )
    .unwrap();
    table
}

fn top(ctx: &Context, pinyin: &str) -> String {
    ctx.new_instance()
        .convert(pinyin, "")
        .unwrap()
        .candidates
        .into_iter()
        .next()
        .unwrap_or_default()
}

#[test]
fn built_artifacts_open_as_data_dir() {
    let dir = scratch_dir("roundtrip");
    let table = write_table(&dir);
    let out = dir.join("data");

    let keys = build_artifacts(&table, &out).unwrap();
    assert_eq!(keys, 4);
    assert!(out.join("lexicon.fst").exists());
    assert!(out.join("lexicon.bincode").exists());

    let ctx = Context::open(Some(&out), None, PinyinConfig::default()).unwrap();
    assert_eq!(top(&ctx, "nihao"), "你好");
    assert_eq!(top(&ctx, "zhongguo"), "中国");
}

#[test]
fn data_dir_takes_precedence_over_table() {
    let dir = scratch_dir("precedence");
    let table = write_table(&dir);
    let missing = dir.join("no-such-data");

    let err = Context::open(Some(&missing), Some(&table), PinyinConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Initialization(_)));

    let ctx = Context::open(None, Some(&table), PinyinConfig::default()).unwrap();
    assert_eq!(ctx.lexicon().len(), 4);
}

#[test]
fn open_without_sources_uses_demo_lexicon() {
    let ctx = Context::open(None, None, PinyinConfig::default()).unwrap();
    assert_eq!(ctx.lexicon().len(), Context::demo().lexicon().len());
    assert_eq!(top(&ctx, "nihao"), "你好");
}

#[test]
fn building_from_missing_table_fails() {
    let dir = scratch_dir("missing");
    let err = build_artifacts(dir.join("absent.txt"), dir.join("data")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
