//! Static reference tables joined by the enricher.

use super::{ConditionInfo, TermReference};

/// (canonical term, definition, reference range)
const TERM_REFERENCE: &[(&str, &str, Option<&str>)] = &[
    ("brain", "The organ inside the skull that controls thought, movement and the senses.", None),
    ("frontal lobe", "The front part of the brain, involved in planning, behaviour, speech and movement.", None),
    ("lung", "One of the paired organs in the chest responsible for gas exchange.", None),
    ("mass", "An abnormal lump or collection of tissue; it may be benign or malignant.", None),
    ("lesion", "A general term for an area of abnormal tissue.", None),
    ("tumor", "An abnormal growth of cells that may be benign or malignant.", None),
    ("contrast enhancement", "Brightening of tissue after contrast injection, often reflecting increased blood flow or a disrupted blood-brain barrier.", None),
    ("edema", "Swelling caused by excess fluid in tissue.", None),
    ("midline shift", "Displacement of brain structures away from the midline, usually caused by a mass or bleeding.", None),
    ("restricted diffusion", "An MRI sign of reduced water movement in tissue, typical of acute infarction.", None),
    ("infarct", "An area of tissue death caused by loss of blood supply.", None),
    ("hemorrhage", "Bleeding from a damaged blood vessel.", None),
    ("pulmonary nodule", "A small round opacity in the lung, usually under 3 cm.", None),
    ("ground glass opacity", "A hazy area of increased lung density through which vessels remain visible.", None),
    ("consolidation", "Lung tissue filled with fluid or cells instead of air.", None),
    ("pleural effusion", "Fluid collected between the lung and the chest wall.", None),
    ("pulmonary edema", "Fluid accumulation in the lung tissue and air spaces.", None),
    ("cardiomegaly", "Enlargement of the heart on imaging.", None),
    ("atherosclerosis", "Build-up of fatty plaque in artery walls.", None),
    ("stenosis", "Abnormal narrowing of a vessel or passage.", None),
    ("lymphadenopathy", "Enlarged lymph nodes.", None),
    ("metastasis", "Spread of cancer from its original site to another part of the body.", None),
    ("fracture", "A break in a bone.", None),
    ("osteophyte", "A bony outgrowth along joint margins, typical of degeneration.", None),
    ("osteopenia", "Bone density lower than normal but not low enough to be osteoporosis.", None),
    ("disc herniation", "Displacement of intervertebral disc material beyond its normal margins.", None),
    ("disc bulge", "Broad extension of the disc beyond the vertebral body edges.", None),
    ("steatosis", "Accumulation of fat within liver cells.", None),
    ("hydronephrosis", "Swelling of a kidney caused by urine backing up.", None),
    ("dysplasia", "Abnormal cell development that may precede cancer.", None),
    ("headache", "Pain in the head or upper neck.", None),
    ("glioma", "A tumor arising from the glial (supporting) cells of the brain or spinal cord.", None),
    ("pneumonia", "Infection that inflames the air sacs of one or both lungs.", None),
    ("heart failure", "A condition in which the heart does not pump blood as well as it should.", None),
    ("diabetes", "A chronic condition with high blood glucose levels.", None),
    ("magnetic resonance imaging", "Imaging that uses a magnetic field and radio waves to show soft tissue in detail.", None),
    ("computed tomography", "Cross-sectional X-ray imaging of the body.", None),
    ("gadolinium", "A contrast agent used in MRI to improve the visibility of tissues and vessels.", None),
    ("iodinated contrast", "An iodine-based contrast agent used in CT and angiography.", None),
    ("ejection fraction", "The percentage of blood pumped out of the left ventricle with each beat.", Some("55-70%")),
    ("glucose", "The main sugar in the blood and the body's primary energy source.", Some("70-99 mg/dL (fasting)")),
    ("elevated glucose", "Blood glucose above the normal fasting range.", Some("70-99 mg/dL (fasting)")),
    ("hba1c", "Average blood glucose over roughly the previous three months.", Some("Below 5.7%")),
    ("cholesterol", "A fatty substance in the blood needed to build cells.", Some("Below 200 mg/dL")),
    ("elevated cholesterol", "Total cholesterol above the desirable range.", Some("Below 200 mg/dL")),
    ("ldl", "Low-density lipoprotein, the cholesterol fraction linked to plaque build-up.", Some("Below 100 mg/dL")),
    ("high ldl", "LDL cholesterol above the optimal range.", Some("Below 100 mg/dL")),
    ("triglycerides", "A type of fat circulating in the blood.", Some("Below 150 mg/dL")),
    ("hemoglobin", "The oxygen-carrying protein in red blood cells.", Some("13.5-17.5 g/dL (male), 12.0-15.5 g/dL (female)")),
    ("low hemoglobin", "Hemoglobin below the normal range.", Some("13.5-17.5 g/dL (male), 12.0-15.5 g/dL (female)")),
    ("white blood cell count", "The number of infection-fighting cells in the blood.", Some("4.5-11.0 x10^9/L")),
    ("elevated wbc", "White blood cell count above the normal range.", Some("4.5-11.0 x10^9/L")),
    ("platelet count", "The number of clotting cells in the blood.", Some("150-450 x10^9/L")),
    ("tsh", "Thyroid stimulating hormone, which regulates thyroid activity.", Some("0.4-4.0 mIU/L")),
    ("creatinine", "A waste product filtered by the kidneys, used to assess kidney function.", Some("0.7-1.3 mg/dL")),
    ("alt", "A liver enzyme released into blood when liver cells are damaged.", Some("7-56 U/L")),
    ("ast", "An enzyme found in liver and muscle.", Some("10-40 U/L")),
    ("ferritin", "A protein that stores iron.", Some("24-336 ng/mL (male), 11-307 ng/mL (female)")),
    ("troponin", "A heart muscle protein released into blood after heart injury.", Some("Below 0.04 ng/mL")),
    ("bnp", "A hormone released by the heart when it is under strain.", Some("Below 100 pg/mL")),
];

/// (condition, description, management)
const CONDITION_REFERENCE: &[(&str, &str, &str)] = &[
    ("Glioma", "A primary brain tumor arising from glial cells, ranging from slow-growing to aggressive.", "Neurosurgical and neuro-oncology review; biopsy or resection, possibly followed by radiotherapy and chemotherapy."),
    ("Meningioma", "A usually benign tumor arising from the membranes surrounding the brain.", "Observation with serial imaging or surgical removal depending on size and symptoms."),
    ("Brain metastasis", "Cancer that has spread to the brain from another site.", "Search for a primary tumor; options include surgery, radiosurgery and systemic therapy."),
    ("Neoplasm", "An abnormal new growth of tissue, benign or malignant.", "Further characterisation with targeted imaging or tissue sampling."),
    ("Ischemic stroke", "Brain injury caused by interrupted blood supply.", "Urgent stroke-pathway assessment; secondary prevention of vascular risk factors."),
    ("Intracranial hemorrhage", "Bleeding within the skull.", "Urgent neurosurgical assessment and blood pressure control."),
    ("Migraine", "A primary headache disorder with recurrent attacks.", "Trigger management, acute and preventive medication."),
    ("Lung cancer", "Malignant tumor originating in the lung.", "Staging with CT/PET, tissue diagnosis and multidisciplinary review."),
    ("Pulmonary granuloma", "A small inflammatory nodule, often calcified and benign.", "Usually no treatment; follow-up imaging if not clearly benign."),
    ("Pneumonia", "Infection of the lung air spaces.", "Antibiotics or antivirals as appropriate; follow-up imaging to confirm resolution."),
    ("COVID-19", "Respiratory illness caused by SARS-CoV-2.", "Supportive care; antivirals for high-risk patients."),
    ("Interstitial lung disease", "A group of disorders causing inflammation or scarring of lung tissue.", "Pulmonary function testing and specialist review."),
    ("Congestive heart failure", "Reduced cardiac pumping leading to fluid congestion.", "Diuretics, guideline-directed medical therapy and fluid management."),
    ("Cardiomyopathy", "Disease of the heart muscle affecting its size or function.", "Echocardiography, cardiology review and heart failure therapy."),
    ("Coronary artery disease", "Narrowing of the coronary arteries by atherosclerotic plaque.", "Risk factor control, antiplatelet and lipid-lowering therapy; revascularisation if indicated."),
    ("Fracture", "A break in the continuity of a bone.", "Immobilisation or surgical fixation depending on location and displacement."),
    ("Osteoporosis", "Reduced bone mass with increased fracture risk.", "Calcium, vitamin D and anti-resorptive therapy; fall prevention."),
    ("Osteoarthritis", "Degenerative joint disease with cartilage loss.", "Exercise, weight management, analgesia; joint replacement in advanced cases."),
    ("Lumbar disc herniation", "Disc material compressing lumbar nerve roots.", "Physiotherapy and analgesia; surgery for persistent deficits."),
    ("Degenerative disc disease", "Age-related breakdown of the intervertebral discs.", "Physiotherapy, analgesia and activity modification."),
    ("Diabetes mellitus", "Chronic hyperglycemia from impaired insulin secretion or action.", "Lifestyle change, glucose-lowering medication and HbA1c monitoring."),
    ("Hypercholesterolemia", "Elevated blood cholesterol.", "Diet, exercise and lipid-lowering therapy."),
    ("Anemia", "Reduced red blood cells or hemoglobin.", "Identify the cause (iron, B12, blood loss) and treat accordingly."),
    ("Infection", "Invasion of tissue by pathogens.", "Source identification, cultures and targeted antimicrobial therapy."),
    ("Hypothyroidism", "Underactive thyroid gland.", "Thyroid hormone replacement with TSH monitoring."),
    ("Hyperthyroidism", "Overactive thyroid gland.", "Antithyroid medication, radioiodine or surgery."),
    ("Chronic kidney disease", "Progressive loss of kidney function.", "Blood pressure and glucose control; nephrology referral when advanced."),
    ("Liver disease", "Inflammation or damage of the liver.", "Identify the cause; avoid hepatotoxins; hepatology review."),
    ("Premalignant change", "Cellular changes that may progress to cancer.", "Close surveillance or excision depending on grade."),
];

pub(super) fn builtin_term_reference() -> Vec<TermReference> {
    TERM_REFERENCE
        .iter()
        .map(|(term, definition, range)| TermReference {
            canonical_form: term.to_string(),
            definition: Some(definition.to_string()),
            reference_range: range.map(str::to_string),
        })
        .collect()
}

pub(super) fn builtin_condition_reference() -> Vec<ConditionInfo> {
    CONDITION_REFERENCE
        .iter()
        .map(|(name, description, management)| ConditionInfo {
            name: name.to_string(),
            description: Some(description.to_string()),
            management: Some(management.to_string()),
        })
        .collect()
}
