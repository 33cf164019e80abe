//! Condition signatures: weighted term sets characterizing predictable conditions.
//!
//! Weights reflect specificity. A condition-named term (e.g. "glioma") carries
//! most of the weight; supporting findings and locations carry less.

use super::{ConditionSignature, SignatureKey, SignatureTerm};
use crate::models::TermCategory;

enum Key {
    T(&'static str),
    C(TermCategory),
}

use Key::{C, T};

const SIGNATURES: &[(&str, &[(Key, f32)])] = &[
    (
        "Glioma",
        &[
            (T("glioma"), 4.0),
            (T("mass"), 1.0),
            (T("contrast enhancement"), 1.0),
            (T("edema"), 1.0),
            (T("frontal lobe"), 0.5),
            (T("headache"), 0.5),
            (T("seizure"), 0.5),
        ],
    ),
    (
        "Meningioma",
        &[
            (T("meningioma"), 4.0),
            (T("mass"), 1.0),
            (T("contrast enhancement"), 1.0),
            (T("headache"), 0.5),
        ],
    ),
    (
        "Brain metastasis",
        &[
            (T("metastasis"), 3.0),
            (T("brain"), 1.0),
            (T("lesion"), 1.0),
            (T("contrast enhancement"), 1.0),
            (T("edema"), 1.0),
        ],
    ),
    (
        "Neoplasm",
        &[
            (T("mass"), 2.0),
            (T("tumor"), 2.0),
            (T("malignancy"), 2.0),
            (T("lesion"), 1.5),
            (T("metastasis"), 2.0),
            (T("lymphadenopathy"), 1.0),
            (C(TermCategory::Anatomy), 0.5),
        ],
    ),
    (
        "Ischemic stroke",
        &[
            (T("stroke"), 4.0),
            (T("infarct"), 3.0),
            (T("restricted diffusion"), 2.0),
            (T("brain"), 0.5),
        ],
    ),
    (
        "Intracranial hemorrhage",
        &[
            (T("hemorrhage"), 3.0),
            (T("brain"), 1.0),
            (T("midline shift"), 1.5),
            (T("mass effect"), 1.0),
            (T("headache"), 0.5),
        ],
    ),
    (
        "Migraine",
        &[
            (T("headache"), 2.0),
            (T("aura"), 2.0),
            (T("photophobia"), 1.0),
        ],
    ),
    (
        "Lung cancer",
        &[
            (T("lung cancer"), 4.0),
            (T("pulmonary nodule"), 2.0),
            (T("spiculated margin"), 2.0),
            (T("mass"), 1.0),
            (T("lymphadenopathy"), 1.0),
            (T("lung"), 0.5),
        ],
    ),
    (
        "Pulmonary granuloma",
        &[
            (T("granuloma"), 3.0),
            (T("calcified nodule"), 2.0),
            (T("pulmonary nodule"), 1.0),
        ],
    ),
    (
        "Pneumonia",
        &[
            (T("pneumonia"), 4.0),
            (T("consolidation"), 3.0),
            (T("air bronchogram"), 1.5),
            (T("opacity"), 1.0),
            (T("fever"), 1.0),
            (T("cough"), 1.0),
            (T("elevated wbc"), 1.0),
        ],
    ),
    (
        "COVID-19",
        &[
            (T("covid-19"), 4.0),
            (T("ground glass opacity"), 3.0),
            (T("fever"), 0.5),
            (T("cough"), 0.5),
        ],
    ),
    (
        "Interstitial lung disease",
        &[
            (T("ground glass opacity"), 2.0),
            (T("lung"), 0.5),
            (T("dyspnea"), 1.0),
        ],
    ),
    (
        "Congestive heart failure",
        &[
            (T("heart failure"), 4.0),
            (T("cardiomegaly"), 2.0),
            (T("pulmonary edema"), 2.5),
            (T("pleural effusion"), 1.5),
            (T("bnp"), 1.0),
            (T("dyspnea"), 0.5),
        ],
    ),
    (
        "Cardiomyopathy",
        &[
            (T("cardiomyopathy"), 4.0),
            (T("cardiomegaly"), 2.0),
            (T("reduced ejection fraction"), 2.0),
        ],
    ),
    (
        "Coronary artery disease",
        &[
            (T("coronary calcification"), 2.5),
            (T("atherosclerosis"), 2.0),
            (T("coronary artery"), 1.0),
            (T("stenosis"), 1.0),
            (T("troponin"), 1.0),
            (T("chest pain"), 1.0),
        ],
    ),
    (
        "Fracture",
        &[
            (T("fracture"), 4.0),
            (T("compression fracture"), 2.0),
            (T("x-ray"), 0.5),
        ],
    ),
    (
        "Osteoporosis",
        &[
            (T("osteoporosis"), 4.0),
            (T("osteopenia"), 2.0),
            (T("compression fracture"), 2.0),
        ],
    ),
    (
        "Osteoarthritis",
        &[
            (T("osteoarthritis"), 4.0),
            (T("osteophyte"), 2.5),
            (T("joint space narrowing"), 2.0),
            (T("knee"), 0.5),
            (T("hip"), 0.5),
        ],
    ),
    (
        "Lumbar disc herniation",
        &[
            (T("disc herniation"), 3.0),
            (T("nerve root compression"), 2.0),
            (T("radiculopathy"), 2.0),
            (T("lumbar spine"), 1.0),
            (T("back pain"), 0.5),
        ],
    ),
    (
        "Degenerative disc disease",
        &[
            (T("disc degeneration"), 3.0),
            (T("disc bulge"), 2.0),
            (T("osteophyte"), 1.0),
            (T("spinal stenosis"), 1.0),
            (T("back pain"), 0.5),
        ],
    ),
    (
        "Diabetes mellitus",
        &[
            (T("diabetes"), 4.0),
            (T("elevated glucose"), 3.0),
            (T("hba1c"), 2.0),
            (T("glucose"), 1.0),
            (T("metformin"), 1.0),
            (T("insulin"), 1.0),
        ],
    ),
    (
        "Hypercholesterolemia",
        &[
            (T("elevated cholesterol"), 3.0),
            (T("high ldl"), 3.0),
            (T("cholesterol"), 1.0),
            (T("ldl"), 1.0),
            (T("elevated triglycerides"), 1.0),
        ],
    ),
    (
        "Anemia",
        &[
            (T("anemia"), 4.0),
            (T("low hemoglobin"), 3.0),
            (T("hemoglobin"), 1.0),
            (T("ferritin"), 1.0),
        ],
    ),
    (
        "Infection",
        &[
            (T("abscess"), 2.5),
            (T("elevated wbc"), 2.0),
            (T("fever"), 1.5),
            (T("inflammation"), 1.0),
            (T("antibiotic"), 1.0),
        ],
    ),
    (
        "Hypothyroidism",
        &[
            (T("hypothyroidism"), 4.0),
            (T("elevated tsh"), 3.0),
            (T("tsh"), 1.0),
            (T("levothyroxine"), 1.0),
        ],
    ),
    (
        "Hyperthyroidism",
        &[
            (T("hyperthyroidism"), 4.0),
            (T("decreased tsh"), 3.0),
            (T("tsh"), 1.0),
        ],
    ),
    (
        "Chronic kidney disease",
        &[
            (T("chronic kidney disease"), 4.0),
            (T("elevated creatinine"), 3.0),
            (T("creatinine"), 1.0),
            (T("hydronephrosis"), 1.0),
            (T("kidney"), 0.5),
        ],
    ),
    (
        "Liver disease",
        &[
            (T("hepatitis"), 3.0),
            (T("elevated alt"), 2.0),
            (T("elevated ast"), 2.0),
            (T("steatosis"), 2.0),
            (T("hepatomegaly"), 1.5),
            (T("liver"), 0.5),
        ],
    ),
    (
        "Premalignant change",
        &[
            (T("dysplasia"), 3.0),
            (T("atypical cells"), 2.5),
            (T("hyperplasia"), 1.0),
            (T("biopsy"), 0.5),
        ],
    ),
];

pub(super) fn builtin_signatures() -> Vec<ConditionSignature> {
    SIGNATURES
        .iter()
        .map(|(name, terms)| ConditionSignature {
            name: name.to_string(),
            signature: terms
                .iter()
                .map(|(key, weight)| SignatureTerm {
                    key: match key {
                        T(canonical) => SignatureKey::Term(canonical.to_string()),
                        C(category) => SignatureKey::Category(*category),
                    },
                    weight: *weight,
                })
                .collect(),
        })
        .collect()
}
