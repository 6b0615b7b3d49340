//! Static metadata for the supported healthcare data formats.

use serde::Serialize;

use crate::core::FileType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FileCategory {
    #[serde(rename = "Native / Optimised Formats")]
    Native,
    #[serde(rename = "Standard Interoperability Formats")]
    Interoperability,
    #[serde(rename = "Semi-Structured")]
    SemiStructured,
    #[serde(rename = "Domain-Specific")]
    DomainSpecific,
}

impl FileCategory {
    pub const ALL: [FileCategory; 4] = [
        FileCategory::Native,
        FileCategory::Interoperability,
        FileCategory::SemiStructured,
        FileCategory::DomainSpecific,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            FileCategory::Native => "Native / Optimised Formats",
            FileCategory::Interoperability => "Standard Interoperability Formats",
            FileCategory::SemiStructured => "Semi-Structured",
            FileCategory::DomainSpecific => "Domain-Specific",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FormatInfo {
    pub id: FileType,
    pub category: FileCategory,
    pub name: &'static str,
    /// Lowercase, with leading dot
    pub extensions: &'static [&'static str],
    pub description: &'static str,
    pub use_case: &'static str,
    pub structure: &'static str,
}

pub static FORMATS: [FormatInfo; 8] = [
    FormatInfo {
        id: FileType::Parquet,
        category: FileCategory::Native,
        name: "Parquet",
        extensions: &[".parquet"],
        description: "Columnar storage format optimized for analytics and big data processing with efficient compression.",
        use_case: "Large-scale analytics, data warehousing, ML training datasets, EHR exports",
        structure: "Columnar binary format with schema, row groups, and column chunks",
    },
    FormatInfo {
        id: FileType::Avro,
        category: FileCategory::Native,
        name: "Avro",
        extensions: &[".avro"],
        description: "Row-based binary format with embedded schema, ideal for streaming and schema evolution.",
        use_case: "Streaming data pipelines, Kafka integration, schema evolution, data serialization",
        structure: "Binary container with JSON schema header, followed by data blocks with sync markers",
    },
    FormatInfo {
        id: FileType::Csv,
        category: FileCategory::Interoperability,
        name: "CSV",
        extensions: &[".csv"],
        description: "Comma-separated values format for tabular data, commonly used in clinical trials and patient records.",
        use_case: "Patient records, clinical trial data, lab results, billing data, data exports",
        structure: "Plain text with header row, comma-delimited columns, one record per line",
    },
    FormatInfo {
        id: FileType::Xlsx,
        category: FileCategory::Interoperability,
        name: "Excel (XLSX)",
        extensions: &[".xlsx"],
        description: "Microsoft Excel format with support for multiple sheets, formulas, and rich formatting.",
        use_case: "Complex reports, multi-sheet datasets, financial records, administrative data, regulatory submissions",
        structure: "ZIP-compressed XML format with worksheets, styles, shared strings, and metadata",
    },
    FormatInfo {
        id: FileType::Json,
        category: FileCategory::SemiStructured,
        name: "JSON (FHIR)",
        extensions: &[".json"],
        description: "FHIR (Fast Healthcare Interoperability Resources) standard for healthcare data exchange using JSON.",
        use_case: "Healthcare data exchange, EHR interoperability, patient records, clinical data APIs",
        structure: "Nested JSON objects following FHIR resource schemas with references and extensions",
    },
    FormatInfo {
        id: FileType::Dicom,
        category: FileCategory::DomainSpecific,
        name: "DICOM",
        extensions: &[".dcm", ".dicom"],
        description: "Digital Imaging and Communications in Medicine standard for medical imaging data.",
        use_case: "Medical imaging (CT, MRI, X-ray, ultrasound), PACS systems, radiology workflows, AI diagnostics",
        structure: "Binary format with metadata header (tags) followed by pixel data, supports multiple frames",
    },
    FormatInfo {
        id: FileType::Fastq,
        category: FileCategory::DomainSpecific,
        name: "FASTQ",
        extensions: &[".fastq", ".fq", ".fastq.gz"],
        description: "Text-based format for storing nucleotide sequences and quality scores from high-throughput sequencing.",
        use_case: "Genomic sequencing data, DNA/RNA analysis, bioinformatics pipelines, variant calling",
        structure: "Four lines per sequence: @identifier, sequence, +separator, quality scores (Phred+33)",
    },
    FormatInfo {
        id: FileType::Edf,
        category: FileCategory::DomainSpecific,
        name: "EDF",
        extensions: &[".edf", ".edf+"],
        description: "European Data Format for storing multichannel physiological signals like EEG, ECG, and polysomnography.",
        use_case: "EEG recordings, sleep studies, ECG monitoring, physiological research, ICU monitoring",
        structure: "Header with patient/recording info and signal specifications, followed by data records with multiplexed samples",
    },
];

pub fn all() -> &'static [FormatInfo] {
    &FORMATS
}

pub fn get(id: FileType) -> &'static FormatInfo {
    // FORMATS is in FileType declaration order
    &FORMATS[id as usize]
}

/// Formats grouped by category, categories in display order.
pub fn by_category() -> Vec<(FileCategory, Vec<&'static FormatInfo>)> {
    FileCategory::ALL
        .into_iter()
        .map(|c| (c, FORMATS.iter().filter(|f| f.category == c).collect()))
        .collect()
}

/// Infer the declared type from a file name; the longest matching extension wins.
pub fn detect(file_name: &str) -> Option<FileType> {
    let lower = file_name.to_ascii_lowercase();
    FORMATS
        .iter()
        .flat_map(|f| f.extensions.iter().map(move |ext| (f.id, *ext)))
        .filter(|(_, ext)| lower.ends_with(ext))
        .max_by_key(|(_, ext)| ext.len())
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_file_type_has_metadata() {
        for ft in FileType::ALL {
            assert_eq!(get(ft).id, ft);
        }
        assert_eq!(all().len(), FileType::ALL.len());
    }

    #[test]
    fn test_grouping_preserves_catalog_order() {
        let groups = by_category();
        assert_eq!(groups.len(), 4);
        let native: Vec<FileType> = groups[0].1.iter().map(|f| f.id).collect();
        assert_eq!(native, vec![FileType::Parquet, FileType::Avro]);
        let domain: Vec<FileType> = groups[3].1.iter().map(|f| f.id).collect();
        assert_eq!(domain, vec![FileType::Dicom, FileType::Fastq, FileType::Edf]);
    }

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(detect("vitals.CSV"), Some(FileType::Csv));
        assert_eq!(detect("reads.fastq.gz"), Some(FileType::Fastq));
        assert_eq!(detect("scan.dcm"), Some(FileType::Dicom));
        assert_eq!(detect("sleep.edf+"), Some(FileType::Edf));
        assert_eq!(detect("notes.txt"), None);
    }
}
