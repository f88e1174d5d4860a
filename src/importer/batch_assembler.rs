// ==========================================
// 商品表格导入器 - 批次组装器
// ==========================================
// 职责: 表格行 → 校验批次（映射 + 校验 + 分流）
// 流程:
// 1. 行数上限（> 1000 非空白数据行 → 单条批次错误，不做行级校验）
// 2. 逐行: 空白行跳过 → 映射 → 校验 → 记录 / 错误
// 3. 返回 ValidatedBatch（记录保持行序）
// 行号: 数据下标 + 2（第 1 行为表头）
// ==========================================

use crate::config::ImporterConfig;
use crate::domain::mapping::ColumnMapping;
use crate::domain::product::TabularRow;
use crate::domain::validation::ValidatedBatch;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::field_mapper::FieldMapper;
use crate::importer::record_validator::{RecordValidator, ValidationRules};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

pub struct BatchAssembler {
    mapper: FieldMapper,
    validator: RecordValidator,
    cleaner: DataCleaner,
}

impl BatchAssembler {
    pub fn new(mapper: FieldMapper, validator: RecordValidator) -> Self {
        Self {
            mapper,
            validator,
            cleaner: DataCleaner,
        }
    }

    /// 按配置构建（规则档位 + 非数值策略）
    pub fn from_config(config: &ImporterConfig) -> Self {
        Self::new(
            FieldMapper::new(config.invalid_number_policy),
            RecordValidator::new(config.rule_profile.rules()),
        )
    }

    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.validator = RecordValidator::new(rules);
        self
    }

    /// 组装校验批次
    ///
    /// # 参数
    /// - rows: 表格行（rows[0] 为表头）
    /// - mapping: 列映射（必填列检查由调用方负责）
    ///
    /// # 返回
    /// 校验批次；同一输入两次组装结果相同
    #[instrument(skip_all, fields(rows = rows.len()))]
    pub fn assemble(&self, rows: &[TabularRow], mapping: &ColumnMapping) -> ValidatedBatch {
        let data_rows = rows.get(1..).unwrap_or_default();
        let mut batch = ValidatedBatch {
            total_rows: data_rows.len(),
            ..ValidatedBatch::default()
        };

        // ===== 批次上限（空白行不计） =====
        let product_rows = data_rows
            .iter()
            .filter(|row| !self.cleaner.is_blank_row(row))
            .count();
        if let Some(error) = self.validator.validate_batch_size(product_rows) {
            warn!(product_rows, "超过单次导入上限，跳过行级校验");
            batch.errors.push(error);
            return batch;
        }

        // ===== 逐行映射 + 校验 =====
        let mut seen_skus = HashSet::new();
        for (idx, row) in data_rows.iter().enumerate() {
            let row_number = idx + 2;

            if self.cleaner.is_blank_row(row) {
                debug!(row_number, "空白行，跳过");
                continue;
            }

            let candidate = self.mapper.map_row(row, mapping, row_number);
            match self.validator.validate_record(&candidate, mapping, &mut seen_skus) {
                Ok(record) => batch.records.push(record),
                Err(errors) => {
                    debug!(row_number, errors = errors.len(), "行校验失败");
                    batch.errors.extend(errors);
                }
            }
        }

        info!(
            total_rows = batch.total_rows,
            valid = batch.records.len(),
            errors = batch.errors.len(),
            "批次组装完成"
        );

        batch
    }
}

impl Default for BatchAssembler {
    fn default() -> Self {
        Self::new(FieldMapper::default(), RecordValidator::default())
    }
}
