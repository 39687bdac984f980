// services/bank-dash/src/forms.rs
//
// Modal forms: field model, editing, and conversion to typed payloads
//

use chrono::{Duration, NaiveDate};
use svckit::types::{
    BloodGroup, ComponentType, Created, Donor, DonorUpdate, Eligibility, NewDonation, NewDonor,
    NewRequest, NewScreening, RequestStatus, RequestStatusUpdate, UrgencyLevel,
};
use svckit::{BankApi, BankError, BankResult};

use crate::state::{Lookups, Page};

const DATE_FORMAT: &str = "%Y-%m-%d";
const GENDERS: [&str; 3] = ["Male", "Female", "Other"];
const ELIGIBILITY: [Eligibility; 2] = [Eligibility::Eligible, Eligibility::NotEligible];

/// Expiry date of a donation: the component's shelf life from the donation
/// date, 35 days when no component is chosen yet.
pub fn expiry_for(donation_date: NaiveDate, component: Option<ComponentType>) -> NaiveDate {
    let days = component.map_or(35, |c| c.shelf_life_days());
    donation_date + Duration::days(days)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    fn same(value: &str) -> Self {
        Self::new(value, value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Number,
    Decimal,
    Date,
    Select(Vec<SelectOption>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub value: String,
}

impl Field {
    fn new(name: &'static str, label: &'static str, kind: FieldKind, required: bool) -> Self {
        Self {
            name,
            label,
            kind,
            required,
            value: String::new(),
        }
    }

    fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// What the UI shows: the option label for selects, the raw text otherwise.
    pub fn display(&self) -> String {
        match &self.kind {
            FieldKind::Select(options) => options
                .iter()
                .find(|o| o.value == self.value)
                .map(|o| o.label.clone())
                .unwrap_or_else(|| format!("Select {}", self.label)),
            _ => self.value.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    RegisterDonor,
    EditDonor { donor_id: u64 },
    RecordDonation,
    RecordScreening,
    CreateRequest,
    UpdateRequestStatus { request_id: u64 },
}

impl FormKind {
    pub fn title(&self) -> &'static str {
        match self {
            FormKind::RegisterDonor => "Register New Donor",
            FormKind::EditDonor { .. } => "Edit Donor",
            FormKind::RecordDonation => "Record Donation",
            FormKind::RecordScreening => "Record Health Screening",
            FormKind::CreateRequest => "Create Blood Request",
            FormKind::UpdateRequestStatus { .. } => "Update Request Status",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    kind: FormKind,
    fields: Vec<Field>,
    focus: usize,
    submitting: bool,
}

fn blood_group_options() -> FieldKind {
    FieldKind::Select(BloodGroup::ALL.iter().map(|g| SelectOption::same(g.as_str())).collect())
}

fn component_options() -> FieldKind {
    FieldKind::Select(ComponentType::ALL.iter().map(|c| SelectOption::same(c.as_str())).collect())
}

fn gender_options() -> FieldKind {
    FieldKind::Select(GENDERS.iter().map(|g| SelectOption::same(g)).collect())
}

fn donor_options(donors: &[Donor]) -> FieldKind {
    FieldKind::Select(
        donors
            .iter()
            .map(|d| {
                SelectOption::new(
                    d.donor_id.to_string(),
                    format!("{} ({}) - ID: {}", d.name, d.blood_group, d.donor_id),
                )
            })
            .collect(),
    )
}

fn date_value(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

impl Form {
    fn build(kind: FormKind, fields: Vec<Field>) -> Self {
        Self {
            kind,
            fields,
            focus: 0,
            submitting: false,
        }
    }

    pub fn register_donor() -> Self {
        Self::build(
            FormKind::RegisterDonor,
            vec![
                Field::new("name", "Full Name", FieldKind::Text, true),
                Field::new("age", "Age", FieldKind::Number, true),
                Field::new("gender", "Gender", gender_options(), true),
                Field::new("blood_group", "Blood Group", blood_group_options(), true),
                Field::new("contact", "Contact", FieldKind::Text, true),
                Field::new("email", "Email", FieldKind::Text, false),
                Field::new("address", "Address", FieldKind::Text, false),
                Field::new("city", "City", FieldKind::Text, false),
            ],
        )
    }

    /// Pre-filled from the donor as fetched from the backend.
    pub fn edit_donor(donor: &Donor) -> Self {
        Self::build(
            FormKind::EditDonor {
                donor_id: donor.donor_id,
            },
            vec![
                Field::new("name", "Full Name", FieldKind::Text, true).with_value(&donor.name),
                Field::new("age", "Age", FieldKind::Number, true).with_value(donor.age.to_string()),
                Field::new("gender", "Gender", gender_options(), true).with_value(&donor.gender),
                Field::new("blood_group", "Blood Group", blood_group_options(), true)
                    .with_value(donor.blood_group.as_str()),
                Field::new("contact", "Contact", FieldKind::Text, true)
                    .with_value(donor.phone.clone().unwrap_or_default()),
                Field::new("email", "Email", FieldKind::Text, false)
                    .with_value(donor.email.clone().unwrap_or_default()),
                Field::new("city", "City", FieldKind::Text, false)
                    .with_value(donor.city.clone().unwrap_or_default()),
            ],
        )
    }

    pub fn record_donation(lookups: &Lookups, today: NaiveDate) -> Self {
        let banks = FieldKind::Select(
            lookups
                .banks
                .iter()
                .map(|b| SelectOption::new(b.bank_id.to_string(), b.bank_name.clone()))
                .collect(),
        );
        Self::build(
            FormKind::RecordDonation,
            vec![
                Field::new("donor_id", "Donor", donor_options(&lookups.active_donors), true),
                Field::new("bank_id", "Blood Bank", banks, true),
                Field::new("donation_date", "Donation Date", FieldKind::Date, true)
                    .with_value(date_value(today)),
                Field::new("component_type", "Component Type", component_options(), true),
                Field::new("quantity_units", "Quantity (units)", FieldKind::Number, true)
                    .with_value("1"),
                Field::new("expiry_date", "Expiry Date", FieldKind::Date, true)
                    .with_value(date_value(expiry_for(today, None))),
                Field::new("screening_id", "Screening ID", FieldKind::Number, false),
            ],
        )
    }

    pub fn record_screening(lookups: &Lookups, today: NaiveDate) -> Self {
        Self::build(
            FormKind::RecordScreening,
            vec![
                Field::new("donor_id", "Donor", donor_options(&lookups.active_donors), true),
                Field::new("screening_date", "Screening Date", FieldKind::Date, true)
                    .with_value(date_value(today)),
                Field::new("bp", "Blood Pressure", FieldKind::Text, false),
                Field::new("weight", "Weight (kg)", FieldKind::Decimal, false),
                Field::new("disease_detected", "Disease Detected", FieldKind::Text, false),
                Field::new(
                    "eligibility_status",
                    "Eligibility",
                    FieldKind::Select(ELIGIBILITY.iter().map(|e| SelectOption::same(e.as_str())).collect()),
                    true,
                ),
            ],
        )
    }

    pub fn create_request(lookups: &Lookups) -> Self {
        let hospitals = FieldKind::Select(
            lookups
                .hospitals
                .iter()
                .map(|h| SelectOption::new(h.hospital_id.to_string(), h.hospital_name.clone()))
                .collect(),
        );
        Self::build(
            FormKind::CreateRequest,
            vec![
                Field::new("hospital_id", "Hospital", hospitals, true),
                Field::new("blood_group", "Blood Group", blood_group_options(), true),
                Field::new("component_type", "Component Type", component_options(), true),
                Field::new("quantity_units", "Quantity (units)", FieldKind::Number, true),
                Field::new(
                    "urgency_level",
                    "Urgency",
                    FieldKind::Select(
                        UrgencyLevel::SELECTABLE
                            .iter()
                            .map(|u| SelectOption::same(u.as_str()))
                            .collect(),
                    ),
                    true,
                ),
            ],
        )
    }

    pub fn update_request_status(request_id: u64, current: RequestStatus) -> Self {
        Self::build(
            FormKind::UpdateRequestStatus { request_id },
            vec![Field::new(
                "status",
                "Status",
                FieldKind::Select(
                    RequestStatus::SELECTABLE
                        .iter()
                        .map(|s| SelectOption::same(s.as_str()))
                        .collect(),
                ),
                true,
            )
            .with_value(match current {
                RequestStatus::Unknown => "",
                known => known.as_str(),
            })],
        )
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len().max(1);
    }

    pub fn focus_prev(&mut self) {
        let len = self.fields.len().max(1);
        self.focus = (self.focus + len - 1) % len;
    }

    /// Assigns a field and applies dependent defaults.
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.name == name) {
            field.value = value.into();
        }
        if self.kind == FormKind::RecordDonation
            && (name == "component_type" || name == "donation_date")
        {
            self.recompute_expiry();
        }
    }

    pub fn input_char(&mut self, c: char) {
        let Some(field) = self.fields.get(self.focus) else {
            return;
        };
        if matches!(field.kind, FieldKind::Select(_)) {
            return;
        }
        let mut value = field.value.clone();
        value.push(c);
        let name = field.name;
        self.set_value(name, value);
    }

    pub fn backspace(&mut self) {
        let Some(field) = self.fields.get(self.focus) else {
            return;
        };
        if matches!(field.kind, FieldKind::Select(_)) {
            return;
        }
        let mut value = field.value.clone();
        value.pop();
        let name = field.name;
        self.set_value(name, value);
    }

    /// Steps the focused select through its options.
    pub fn cycle_select(&mut self, forward: bool) {
        let Some(field) = self.fields.get(self.focus) else {
            return;
        };
        let FieldKind::Select(options) = &field.kind else {
            return;
        };
        if options.is_empty() {
            return;
        }
        let len = options.len();
        let next = match options.iter().position(|o| o.value == field.value) {
            None if forward => 0,
            None => len - 1,
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
        };
        let value = options[next].value.clone();
        let name = field.name;
        self.set_value(name, value);
    }

    fn recompute_expiry(&mut self) {
        let Some(date) = self
            .value("donation_date")
            .and_then(|v| NaiveDate::parse_from_str(v.trim(), DATE_FORMAT).ok())
        else {
            return;
        };
        let component = self
            .value("component_type")
            .and_then(|v| v.parse::<ComponentType>().ok());
        let expiry = date_value(expiry_for(date, component));
        if let Some(field) = self.fields.iter_mut().find(|f| f.name == "expiry_date") {
            field.value = expiry;
        }
    }

    fn field(&self, name: &str) -> BankResult<&Field> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| BankError::Unknown(format!("form has no field {}", name)))
    }

    fn required_text(&self, name: &str) -> BankResult<String> {
        let field = self.field(name)?;
        let value = field.value.trim();
        if value.is_empty() {
            return Err(BankError::missing_field(field.label));
        }
        Ok(value.to_string())
    }

    fn optional_text(&self, name: &str) -> BankResult<Option<String>> {
        let value = self.field(name)?.value.trim();
        Ok((!value.is_empty()).then(|| value.to_string()))
    }

    fn required_number<T: std::str::FromStr>(&self, name: &str) -> BankResult<T> {
        let label = self.field(name)?.label;
        let raw = self.required_text(name)?;
        raw.parse::<T>()
            .map_err(|_| BankError::validation(format!("{} must be a whole number", label)))
    }

    fn optional_number<T: std::str::FromStr>(&self, name: &str) -> BankResult<Option<T>> {
        match self.optional_text(name)? {
            None => Ok(None),
            Some(_) => self.required_number(name).map(Some),
        }
    }

    fn optional_decimal(&self, name: &str) -> BankResult<Option<f64>> {
        let label = self.field(name)?.label;
        match self.optional_text(name)? {
            None => Ok(None),
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Some)
                .ok_or_else(|| BankError::validation(format!("{} must be a number", label))),
        }
    }

    fn required_date(&self, name: &str) -> BankResult<NaiveDate> {
        let label = self.field(name)?.label;
        let raw = self.required_text(name)?;
        NaiveDate::parse_from_str(&raw, DATE_FORMAT)
            .map_err(|_| BankError::validation(format!("{} must be a date (YYYY-MM-DD)", label)))
    }

    fn required_choice<T: Copy>(
        &self,
        name: &str,
        choices: &[T],
        label_of: impl Fn(&T) -> &'static str,
    ) -> BankResult<T> {
        let label = self.field(name)?.label;
        let raw = self.required_text(name)?;
        choices
            .iter()
            .find(|c| label_of(*c) == raw)
            .copied()
            .ok_or_else(|| BankError::validation(format!("{} is not a valid choice", label)))
    }

    /// Builds the typed payload. Empty optional fields are omitted and no
    /// backend call is warranted when this fails.
    pub fn payload(&self) -> BankResult<Submission> {
        match self.kind {
            FormKind::RegisterDonor => Ok(Submission::RegisterDonor(NewDonor {
                name: self.required_text("name")?,
                age: self.required_number("age")?,
                gender: self.required_text("gender")?,
                blood_group: self.required_choice("blood_group", &BloodGroup::ALL, BloodGroup::as_str)?,
                contact: self.required_text("contact")?,
                email: self.optional_text("email")?,
                address: self.optional_text("address")?,
                city: self.optional_text("city")?,
            })),
            FormKind::EditDonor { donor_id } => Ok(Submission::UpdateDonor {
                donor_id,
                update: DonorUpdate {
                    name: self.required_text("name")?,
                    age: self.required_number("age")?,
                    gender: self.required_text("gender")?,
                    blood_group: self.required_choice(
                        "blood_group",
                        &BloodGroup::ALL,
                        BloodGroup::as_str,
                    )?,
                    contact: self.required_text("contact")?,
                    email: self.optional_text("email")?,
                    city: self.optional_text("city")?,
                },
            }),
            FormKind::RecordDonation => Ok(Submission::RecordDonation(NewDonation {
                donor_id: self.required_number("donor_id")?,
                bank_id: self.required_number("bank_id")?,
                donation_date: self.required_date("donation_date")?,
                component_type: self.required_choice(
                    "component_type",
                    &ComponentType::ALL,
                    ComponentType::as_str,
                )?,
                quantity_units: self.required_number("quantity_units")?,
                expiry_date: self.required_date("expiry_date")?,
                screening_id: self.optional_number("screening_id")?,
            })),
            FormKind::RecordScreening => Ok(Submission::RecordScreening(NewScreening {
                donor_id: self.required_number("donor_id")?,
                screening_date: self.required_date("screening_date")?,
                bp: self.optional_text("bp")?,
                weight: self.optional_decimal("weight")?,
                disease_detected: self.optional_text("disease_detected")?,
                eligibility_status: self.required_choice(
                    "eligibility_status",
                    &ELIGIBILITY,
                    Eligibility::as_str,
                )?,
            })),
            FormKind::CreateRequest => Ok(Submission::CreateRequest(NewRequest {
                hospital_id: self.required_number("hospital_id")?,
                blood_group: self.required_choice("blood_group", &BloodGroup::ALL, BloodGroup::as_str)?,
                component_type: self.required_choice(
                    "component_type",
                    &ComponentType::ALL,
                    ComponentType::as_str,
                )?,
                quantity_units: self.required_number("quantity_units")?,
                urgency_level: self.required_choice(
                    "urgency_level",
                    &UrgencyLevel::SELECTABLE,
                    UrgencyLevel::as_str,
                )?,
            })),
            FormKind::UpdateRequestStatus { request_id } => Ok(Submission::UpdateRequestStatus {
                request_id,
                update: RequestStatusUpdate {
                    status: self.required_choice(
                        "status",
                        &RequestStatus::SELECTABLE,
                        RequestStatus::as_str,
                    )?,
                },
            }),
        }
    }
}

/// A validated form ready to go to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    RegisterDonor(NewDonor),
    UpdateDonor { donor_id: u64, update: DonorUpdate },
    RecordDonation(NewDonation),
    RecordScreening(NewScreening),
    CreateRequest(NewRequest),
    UpdateRequestStatus { request_id: u64, update: RequestStatusUpdate },
}

impl Submission {
    pub async fn send(&self, api: &dyn BankApi) -> BankResult<Created> {
        match self {
            Submission::RegisterDonor(donor) => api.register_donor(donor).await,
            Submission::UpdateDonor { donor_id, update } => {
                api.update_donor(*donor_id, update).await?;
                Ok(Created::default())
            }
            Submission::RecordDonation(donation) => api.record_donation(donation).await,
            Submission::RecordScreening(screening) => api.record_screening(screening).await,
            Submission::CreateRequest(request) => api.create_request(request).await,
            Submission::UpdateRequestStatus { request_id, update } => {
                api.update_request_status(*request_id, update).await?;
                Ok(Created::default())
            }
        }
    }

    pub fn success_message(&self, created: &Created) -> String {
        match self {
            Submission::RegisterDonor(_) => "Donor registered successfully!".to_string(),
            Submission::UpdateDonor { .. } => "Donor updated successfully!".to_string(),
            Submission::RecordDonation(_) => "Donation recorded successfully!".to_string(),
            Submission::RecordScreening(_) => format!(
                "✅ Health screening recorded! Screening ID: {}",
                created
                    .health_id
                    .map_or_else(|| "N/A".to_string(), |id| id.to_string())
            ),
            Submission::CreateRequest(_) => "Blood request created successfully!".to_string(),
            Submission::UpdateRequestStatus { .. } => {
                "Request status updated successfully!".to_string()
            }
        }
    }

    pub fn failure_fallback(&self) -> &'static str {
        match self {
            Submission::RegisterDonor(_) => "Error registering donor",
            Submission::UpdateDonor { .. } => "Error updating donor",
            Submission::RecordDonation(_) => "Error recording donation",
            Submission::RecordScreening(_) => "Error recording screening",
            Submission::CreateRequest(_) => "Error creating request",
            Submission::UpdateRequestStatus { .. } => "Error updating request",
        }
    }

    /// Page whose list is reloaded after success.
    pub fn reloads(&self) -> Page {
        match self {
            Submission::RegisterDonor(_) | Submission::UpdateDonor { .. } => Page::Donors,
            Submission::RecordDonation(_) => Page::Donations,
            Submission::RecordScreening(_) => Page::Screenings,
            Submission::CreateRequest(_) | Submission::UpdateRequestStatus { .. } => Page::Requests,
        }
    }

    /// Screening confirmations carry an id worth reading, so they linger.
    pub fn wants_long_toast(&self) -> bool {
        matches!(self, Submission::RecordScreening(_))
    }
}
