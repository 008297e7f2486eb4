// ==========================================
// 库存分配优化系统 - 文件解析器
// ==========================================
// 职责: 表格文件 → 原始记录（表头 → 单元格文本）
// 支持: Excel (.xlsx/.xls，首个工作表) / CSV (.csv)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 一行原始记录
pub type RawRecord = HashMap<String, String>;

// ==========================================
// Trait: FileParser
// ==========================================
pub trait FileParser {
    /// 解析文件为原始记录（单元格去首尾空白，完全空白的行跳过）
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>>;
}

fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = file_extension(path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        // 表头（去除 UTF-8 BOM）
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row_map = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行
            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(row_map);
        }

        Ok(records)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        let path = file_path;

        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let ext = file_extension(path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）
        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut records = Vec::new();
        for data_row in rows {
            let mut row_map = HashMap::new();

            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), cell.to_string().trim().to_string());
                }
            }

            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(row_map);
        }

        Ok(records)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawRecord>> {
        let path = file_path.as_ref();
        match file_extension(path).as_str() {
            "csv" => CsvParser.parse_to_raw_records(path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_records(path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// 按候选列名顺序查找第一个存在的列
pub fn find_column<'a>(headers: impl IntoIterator<Item = &'a String>, candidates: &[&str]) -> Option<String> {
    let headers: Vec<&String> = headers.into_iter().collect();
    candidates
        .iter()
        .find(|candidate| headers.iter().any(|h| h.as_str() == **candidate))
        .map(|candidate| candidate.to_string())
}
