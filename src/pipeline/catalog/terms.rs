//! Medical term catalog: canonical form, category and surface variants.

use super::TermEntry;
use crate::models::TermCategory::{self, *};

/// Declaration order is the tie-break order for overlapping matches of equal length.
const TERMS: &[(&str, TermCategory, &[&str])] = &[
    // ── Anatomy ─────────────────────────────────────────────
    ("brain", Anatomy, &["cerebral", "intracranial"]),
    ("frontal lobe", Anatomy, &["frontal lobes"]),
    ("parietal lobe", Anatomy, &["parietal lobes"]),
    ("temporal lobe", Anatomy, &["temporal lobes"]),
    ("occipital lobe", Anatomy, &["occipital lobes"]),
    ("cerebellum", Anatomy, &["cerebellar"]),
    ("lung", Anatomy, &["lungs", "pulmonary"]),
    ("heart", Anatomy, &["cardiac"]),
    ("liver", Anatomy, &["hepatic"]),
    ("kidney", Anatomy, &["kidneys", "renal"]),
    ("spine", Anatomy, &["spinal", "vertebra", "vertebrae", "vertebral"]),
    ("lumbar spine", Anatomy, &["lumbar"]),
    ("cervical spine", Anatomy, &[]),
    ("thyroid", Anatomy, &["thyroid gland"]),
    ("coronary artery", Anatomy, &["coronary arteries"]),
    ("knee", Anatomy, &["knees"]),
    ("hip", Anatomy, &["hips"]),
    ("pleura", Anatomy, &["pleural space"]),
    ("lymph node", Anatomy, &["lymph nodes"]),
    // ── Findings ────────────────────────────────────────────
    ("mass", Finding, &["masses"]),
    ("lesion", Finding, &["lesions"]),
    ("tumor", Finding, &["tumour", "tumors", "tumours"]),
    ("contrast enhancement", Finding, &["enhancing", "enhancement"]),
    ("edema", Finding, &["oedema", "vasogenic edema", "swelling"]),
    ("midline shift", Finding, &[]),
    ("mass effect", Finding, &[]),
    ("restricted diffusion", Finding, &["diffusion restriction"]),
    ("infarct", Finding, &["infarction", "infarcts"]),
    ("hemorrhage", Finding, &["haemorrhage", "bleed"]),
    ("pulmonary nodule", Finding, &["lung nodule", "pulmonary nodules", "lung nodules"]),
    ("nodule", Finding, &["nodules"]),
    ("calcified nodule", Finding, &["calcified granuloma"]),
    ("spiculated margin", Finding, &["spiculated", "spiculation"]),
    ("ground glass opacity", Finding, &[
        "ground-glass opacity",
        "ground glass opacities",
        "ground-glass opacities",
        "ground glass",
        "ground-glass",
    ]),
    ("consolidation", Finding, &["consolidations", "airspace disease"]),
    ("air bronchogram", Finding, &["air bronchograms"]),
    ("opacity", Finding, &["opacities", "opacification"]),
    ("pleural effusion", Finding, &["pleural effusions", "effusion"]),
    ("pulmonary edema", Finding, &["pulmonary oedema", "interstitial edema"]),
    ("cardiomegaly", Finding, &["enlarged heart", "cardiac enlargement"]),
    ("atherosclerosis", Finding, &["atherosclerotic", "plaque"]),
    ("coronary calcification", Finding, &["coronary artery calcification"]),
    ("stenosis", Finding, &["narrowing"]),
    ("lymphadenopathy", Finding, &["enlarged lymph nodes", "adenopathy"]),
    ("metastasis", Finding, &["metastases", "metastatic"]),
    ("malignancy", Finding, &["malignant", "malignant cells"]),
    ("fracture", Finding, &["fractures", "fractured"]),
    ("compression fracture", Finding, &["compression fractures"]),
    ("osteophyte", Finding, &["osteophytes", "osteophytosis"]),
    ("joint space narrowing", Finding, &[]),
    ("osteopenia", Finding, &["reduced bone density"]),
    ("disc herniation", Finding, &["herniated disc", "disc protrusion", "disc extrusion"]),
    ("disc bulge", Finding, &["disc bulging", "bulging disc", "disc buldge"]),
    ("disc degeneration", Finding, &["degenerative disc", "disc desiccation"]),
    ("nerve root compression", Finding, &["nerve root impingement"]),
    ("spinal stenosis", Finding, &["canal stenosis"]),
    ("hepatomegaly", Finding, &["enlarged liver"]),
    ("steatosis", Finding, &["fatty liver", "hepatic steatosis"]),
    ("hydronephrosis", Finding, &[]),
    ("abscess", Finding, &["abscesses"]),
    ("inflammation", Finding, &["inflammatory"]),
    ("necrosis", Finding, &["necrotic"]),
    ("atypical cells", Finding, &["atypia"]),
    ("dysplasia", Finding, &["dysplastic"]),
    ("hyperplasia", Finding, &[]),
    ("headache", Finding, &["headaches", "cephalgia"]),
    ("seizure", Finding, &["seizures"]),
    ("fever", Finding, &["febrile", "pyrexia"]),
    ("cough", Finding, &["coughing"]),
    ("chest pain", Finding, &[]),
    ("dyspnea", Finding, &["shortness of breath", "sob", "dyspnoea"]),
    ("back pain", Finding, &["low back pain"]),
    ("aura", Finding, &[]),
    ("photophobia", Finding, &[]),
    // ── Conditions ──────────────────────────────────────────
    ("glioma", Condition, &["gliomas", "glioblastoma", "gbm", "astrocytoma"]),
    ("meningioma", Condition, &["meningiomas"]),
    ("lung cancer", Condition, &["lung carcinoma", "bronchogenic carcinoma", "nsclc"]),
    ("pneumonia", Condition, &["pneumonitis"]),
    ("granuloma", Condition, &["granulomas", "granulomatous"]),
    ("heart failure", Condition, &["chf", "congestive heart failure", "cardiac failure"]),
    ("cardiomyopathy", Condition, &[]),
    ("stroke", Condition, &["cva", "cerebrovascular accident"]),
    ("osteoarthritis", Condition, &["degenerative joint disease", "djd"]),
    ("osteoporosis", Condition, &[]),
    ("radiculopathy", Condition, &["sciatica"]),
    ("diabetes", Condition, &["diabetes mellitus", "dm", "diabetic"]),
    ("hypertension", Condition, &["htn", "high blood pressure"]),
    ("anemia", Condition, &["anaemia"]),
    ("hypothyroidism", Condition, &[]),
    ("hyperthyroidism", Condition, &[]),
    ("hepatitis", Condition, &[]),
    ("chronic kidney disease", Condition, &["ckd", "renal insufficiency"]),
    ("covid-19", Condition, &["covid", "sars-cov-2"]),
    // ── Procedures / modalities ─────────────────────────────
    ("magnetic resonance imaging", Procedure, &["mri", "mr imaging"]),
    ("computed tomography", Procedure, &["ct", "ct scan", "cat scan"]),
    ("x-ray", Procedure, &["radiograph", "radiographs", "radiography", "xray"]),
    ("ultrasound", Procedure, &["sonography", "ultrasonography"]),
    ("positron emission tomography", Procedure, &["pet", "pet-ct", "pet/ct"]),
    ("biopsy", Procedure, &["biopsies"]),
    ("echocardiogram", Procedure, &["echocardiography", "echo"]),
    // ── Measurement vocabulary ──────────────────────────────
    ("diameter", Measurement, &["diameters"]),
    ("volume", Measurement, &["volumes"]),
    ("ejection fraction", Measurement, &["lvef", "ef"]),
    ("reduced ejection fraction", Measurement, &["reduced ef", "reduced lvef"]),
    ("hounsfield units", Measurement, &["hounsfield unit"]),
    // ── Drugs and contrast agents ───────────────────────────
    ("gadolinium", Drug, &["gadolinium-based contrast", "gadobutrol", "gadoterate", "gadavist", "dotarem", "magnevist"]),
    ("iodinated contrast", Drug, &["iohexol", "iopamidol", "iodixanol", "omnipaque", "isovue", "visipaque"]),
    ("barium", Drug, &["barium sulfate"]),
    ("metformin", Drug, &[]),
    ("insulin", Drug, &[]),
    ("levothyroxine", Drug, &["synthroid"]),
    ("dexamethasone", Drug, &["decadron"]),
    ("antibiotic", Drug, &["antibiotics"]),
    // ── Laboratory values ───────────────────────────────────
    ("glucose", LabValue, &["blood sugar", "blood glucose"]),
    ("elevated glucose", LabValue, &["high blood sugar", "hyperglycemia", "elevated blood glucose"]),
    ("hba1c", LabValue, &["a1c", "hemoglobin a1c", "glycated hemoglobin"]),
    ("cholesterol", LabValue, &["total cholesterol"]),
    ("elevated cholesterol", LabValue, &["high cholesterol", "hypercholesterolemia"]),
    ("ldl", LabValue, &["ldl cholesterol", "low-density lipoprotein"]),
    ("high ldl", LabValue, &["elevated ldl"]),
    ("triglycerides", LabValue, &["triglyceride"]),
    ("elevated triglycerides", LabValue, &["high triglycerides", "hypertriglyceridemia"]),
    ("hemoglobin", LabValue, &["haemoglobin", "hgb", "hb"]),
    ("low hemoglobin", LabValue, &["decreased hemoglobin", "low haemoglobin"]),
    ("white blood cell count", LabValue, &["wbc", "white blood cells", "leukocyte count"]),
    ("elevated wbc", LabValue, &["high white blood cell", "leukocytosis", "elevated white blood cell count"]),
    ("platelet count", LabValue, &["platelets", "plt"]),
    ("low platelet", LabValue, &["low platelets", "thrombocytopenia"]),
    ("tsh", LabValue, &["thyroid stimulating hormone", "thyrotropin"]),
    ("elevated tsh", LabValue, &["high tsh"]),
    ("decreased tsh", LabValue, &["low tsh", "suppressed tsh"]),
    ("creatinine", LabValue, &["serum creatinine"]),
    ("elevated creatinine", LabValue, &["high creatinine"]),
    ("alt", LabValue, &["alanine aminotransferase", "sgpt"]),
    ("elevated alt", LabValue, &["high alt"]),
    ("ast", LabValue, &["aspartate aminotransferase", "sgot"]),
    ("elevated ast", LabValue, &["high ast"]),
    ("ferritin", LabValue, &[]),
    ("troponin", LabValue, &["troponin i", "troponin t"]),
    ("bnp", LabValue, &["b-type natriuretic peptide", "nt-probnp"]),
    // ── Abbreviations without a finer category ──────────────
    ("no acute distress", Abbreviation, &["nad"]),
    ("within normal limits", Abbreviation, &["wnl"]),
    ("status post", Abbreviation, &["s/p"]),
    ("rule out", Abbreviation, &["r/o"]),
];

pub(super) fn builtin_terms() -> Vec<TermEntry> {
    TERMS
        .iter()
        .map(|(canonical, category, synonyms)| TermEntry {
            canonical_form: canonical.to_string(),
            category: *category,
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        })
        .collect()
}
