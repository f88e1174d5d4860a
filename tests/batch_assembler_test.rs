// ==========================================
// BatchAssembler 集成测试
// ==========================================
// 测试目标: 行号 / SKU 规则 / 批次上限 / 非数值策略 / 幂等
// ==========================================

mod test_helpers;

use product_sheet_importer::domain::{LogicalField, ValidatedBatch};
use product_sheet_importer::importer::{
    BatchAssembler, FieldMapper, InvalidNumberPolicy, RecordValidator, ValidationRules,
};
use product_sheet_importer::{logging, MAX_PRODUCTS_PER_IMPORT};
use test_helpers::{col, mapping_abc, rows};

fn presence_only_assembler() -> BatchAssembler {
    BatchAssembler::default().with_rules(ValidationRules::presence_only())
}

fn data_rows(count: usize) -> Vec<Vec<String>> {
    let mut input = vec![vec!["SKU".to_string(), "Name".to_string(), "Brand".to_string()]];
    for i in 0..count {
        input.push(vec![format!("SKU-{:04}", i), "Widget".to_string(), "Acme".to_string()]);
    }
    input
}

#[test]
fn test_duplicate_sku_flagged_on_later_row() {
    logging::init_test();

    let input = rows(&[
        &["SKU", "Name", "Brand"],
        &["A1", "Widget", "Acme"],
        &["A1", "Gadget", "Acme"],
    ]);
    let batch = presence_only_assembler().assemble(&input, &mapping_abc());

    assert_eq!(batch.total_rows, 2);
    assert_eq!(batch.records.len(), 1);
    assert_eq!(batch.records[0].row_number, 2);
    assert_eq!(batch.errors.len(), 1);
    assert_eq!(batch.errors[0].to_string(), "Row 3: Duplicate SKU \"A1\"");
    assert!(!batch.is_submittable());
}

#[test]
fn test_short_sku_rejected_under_standard_rules() {
    let input = rows(&[
        &["SKU", "Name", "Brand"],
        &["A1", "Widget", "Acme"],
    ]);
    let batch = BatchAssembler::default().assemble(&input, &mapping_abc());

    assert!(batch.records.is_empty());
    assert_eq!(batch.errors.len(), 1);
    assert_eq!(batch.errors[0].row, Some(2));
    assert!(batch.errors[0].message.contains("SKU must be at least 3 characters"));
}

#[test]
fn test_every_later_duplicate_gets_exactly_one_error() {
    let input = rows(&[
        &["SKU", "Name", "Brand"],
        &["SKU-1", "Widget", "Acme"],
        &["SKU-2", "Gadget", "Acme"],
        &["SKU-1", "Gizmo", "Acme"],
        &["SKU-1", "Doohickey", "Acme"],
    ]);
    let batch = BatchAssembler::default().assemble(&input, &mapping_abc());

    let duplicate_rows: Vec<_> = batch
        .errors
        .iter()
        .filter(|e| e.message.starts_with("Duplicate SKU"))
        .map(|e| e.row)
        .collect();
    assert_eq!(duplicate_rows, vec![Some(4), Some(5)]);
    assert_eq!(batch.records.len(), 2);
}

#[test]
fn test_batch_over_limit_has_single_error() {
    // 每一行都不合法：若执行了行级校验，会出现带行号的错误
    let mut input = vec![vec!["SKU".to_string(), "Name".to_string(), "Brand".to_string()]];
    for _ in 0..=MAX_PRODUCTS_PER_IMPORT {
        input.push(vec!["X".to_string(), String::new(), String::new()]);
    }
    let batch = BatchAssembler::default().assemble(&input, &mapping_abc());

    assert_eq!(batch.total_rows, 1001);
    assert_eq!(batch.errors.len(), 1);
    assert_eq!(batch.errors[0].row, None);
    assert!(batch.errors.iter().all(|e| e.row.is_none()));
    assert!(batch.errors[0].message.contains("1001 data rows"));
    assert!(batch.records.is_empty());
}

#[test]
fn test_trailing_blank_rows_do_not_count_toward_limit() {
    let mut input = data_rows(MAX_PRODUCTS_PER_IMPORT);
    input.push(vec![String::new(), String::new(), String::new()]);
    input.push(vec![" ".to_string()]);
    let batch = BatchAssembler::default().assemble(&input, &mapping_abc());

    assert!(batch.is_submittable());
    assert_eq!(batch.records.len(), MAX_PRODUCTS_PER_IMPORT);
}

#[test]
fn test_batch_at_limit_is_accepted() {
    let input = data_rows(MAX_PRODUCTS_PER_IMPORT);
    let batch = BatchAssembler::default().assemble(&input, &mapping_abc());

    assert!(batch.is_submittable());
    assert_eq!(batch.records.len(), MAX_PRODUCTS_PER_IMPORT);
}

#[test]
fn test_invalid_price_reject_policy() {
    let mapping = mapping_abc().with(LogicalField::BasePrice, col('D'));
    let input = rows(&[
        &["SKU", "Name", "Brand", "Price"],
        &["SKU-1", "Widget", "Acme", "abc"],
    ]);
    let assembler = BatchAssembler::new(
        FieldMapper::new(InvalidNumberPolicy::Reject),
        RecordValidator::default(),
    );
    let batch = assembler.assemble(&input, &mapping);

    assert_eq!(batch.errors.len(), 1);
    assert!(batch.errors[0].message.contains("Base price must be a valid number"));
    assert_eq!(batch.errors[0].cell.as_deref(), Some("D2"));
}

#[test]
fn test_invalid_price_omit_policy() {
    let mapping = mapping_abc().with(LogicalField::BasePrice, col('D'));
    let input = rows(&[
        &["SKU", "Name", "Brand", "Price"],
        &["SKU-1", "Widget", "Acme", "abc"],
    ]);
    let assembler = BatchAssembler::new(
        FieldMapper::new(InvalidNumberPolicy::Omit),
        RecordValidator::default(),
    );
    let batch = assembler.assemble(&input, &mapping);

    assert!(batch.is_submittable());
    assert_eq!(batch.records[0].base_price, None);

    let payload = serde_json::to_value(&batch.records[0]).unwrap();
    assert!(payload.get("base_price").is_none());
}

#[test]
fn test_negative_numbers_rejected_zero_accepted() {
    let mapping = mapping_abc()
        .with(LogicalField::BasePrice, col('D'))
        .with(LogicalField::Cost, col('E'));
    let input = rows(&[
        &["SKU", "Name", "Brand", "Price", "Cost"],
        &["SKU-1", "Widget", "Acme", "0", "-2.5"],
    ]);
    let batch = BatchAssembler::default().assemble(&input, &mapping);

    assert_eq!(batch.errors.len(), 1);
    assert_eq!(batch.errors[0].field, Some(LogicalField::Cost));
    assert!(batch.errors[0].message.contains("Cost must be zero or greater"));
}

#[test]
fn test_missing_required_cells_report_cell_reference() {
    let input = rows(&[
        &["SKU", "Name", "Brand"],
        &["SKU-1", "Widget", "Acme"],
        &["SKU-2", "Gadget", "Acme"],
        &["SKU-3", "Gizmo", "Acme"],
        &["", "Doohickey", "Acme"],
    ]);
    let batch = BatchAssembler::default().assemble(&input, &mapping_abc());

    assert_eq!(batch.errors.len(), 1);
    assert_eq!(batch.errors[0].message, "SKU is required (cell A5 is empty)");
    assert_eq!(batch.errors[0].to_string(), "Row 5: SKU is required (cell A5 is empty)");
}

#[test]
fn test_optional_fields_and_summary() {
    let mapping = mapping_abc()
        .with(LogicalField::Category, col('D'))
        .with(LogicalField::ImageUrl, col('E'))
        .with(LogicalField::BasePrice, col('F'));
    let input = rows(&[
        &["SKU", "Name", "Brand", "Category", "Image", "Price"],
        &["SKU-1", "Widget", "Acme", "Tools", "https://img/1.png", "9.99"],
        &["SKU-2", "Gadget", "Acme", "", "", ""],
        &["SKU-3", "Gizmo", "Acme", "Toys", "", "0"],
        &["SKU-4", "Doohickey", "Acme"],
    ]);
    let batch = BatchAssembler::default().assemble(&input, &mapping);
    let summary = batch.summary();

    assert_eq!(summary.total_rows, 4);
    assert_eq!(summary.valid_products, 4);
    assert_eq!(summary.with_category, 2);
    assert_eq!(summary.with_image, 1);
    assert_eq!(summary.with_price, 2);
    assert_eq!(summary.sample_products.len(), 3);
    assert_eq!(summary.sample_products[0].sku, "SKU-1");
    assert!(summary.can_proceed);
}

#[test]
fn test_assembly_is_idempotent() {
    let input = rows(&[
        &["SKU", "Name", "Brand"],
        &["SKU-1", "Widget", "Acme"],
        &["SKU-1", "Gadget", "A"],
        &["", "", ""],
        &["SKU-3", "Gi", "Acme"],
    ]);
    let assembler = BatchAssembler::default();

    let first: ValidatedBatch = assembler.assemble(&input, &mapping_abc());
    let second: ValidatedBatch = assembler.assemble(&input, &mapping_abc());
    assert_eq!(first, second);
}
