use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Course, Instructor, Student};

/// Which person table a form or confirmation targets.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum PersonKind {
    Student,
    Instructor,
}

impl PersonKind {
    pub(crate) fn label(self) -> &'static str {
        match self {
            PersonKind::Student => "Student",
            PersonKind::Instructor => "Instructor",
        }
    }
}

/// Style for a field value depending on focus and emptiness.
fn field_style(is_active: bool, is_empty: bool) -> Style {
    if is_active {
        Style::default().fg(Color::Yellow)
    } else if is_empty {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    }
}

/// Internal representation of the student/instructor form fields.
#[derive(Default, Clone)]
pub(crate) struct PersonForm {
    pub(crate) name: String,
    pub(crate) age: String,
    pub(crate) email: String,
    pub(crate) active: PersonField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum PersonField {
    #[default]
    Name,
    Age,
    Email,
}

impl PersonForm {
    pub(crate) fn from_student(student: &Student) -> Self {
        Self::from_parts(&student.name, student.age, &student.email)
    }

    pub(crate) fn from_instructor(instructor: &Instructor) -> Self {
        Self::from_parts(&instructor.name, instructor.age, &instructor.email)
    }

    fn from_parts(name: &str, age: i64, email: &str) -> Self {
        Self {
            name: name.to_string(),
            age: age.to_string(),
            email: email.to_string(),
            active: PersonField::Name,
            error: None,
        }
    }

    /// Cycle focus forward (Name → Age → Email).
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            PersonField::Name => PersonField::Age,
            PersonField::Age => PersonField::Email,
            PersonField::Email => PersonField::Name,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            PersonField::Name => PersonField::Email,
            PersonField::Age => PersonField::Name,
            PersonField::Email => PersonField::Age,
        };
    }

    /// Append a character to the active field. The age field only takes
    /// digits.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            PersonField::Name => self.name.push(ch),
            PersonField::Age => {
                if !ch.is_ascii_digit() {
                    return false;
                }
                self.age.push(ch);
            }
            PersonField::Email => {
                if ch.is_whitespace() {
                    return false;
                }
                self.email.push(ch);
            }
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            PersonField::Name => {
                self.name.pop();
            }
            PersonField::Age => {
                self.age.pop();
            }
            PersonField::Email => {
                self.email.pop();
            }
        }
    }

    /// Turn the raw text into typed values. Email format and age sign are
    /// left to the persistence layer so there is one source of truth.
    pub(crate) fn parse_inputs(&self) -> Result<(String, i64, String)> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Name is required."));
        }
        let age_raw = self.age.trim();
        if age_raw.is_empty() {
            return Err(anyhow!("Age is required."));
        }
        let age = age_raw
            .parse::<i64>()
            .map_err(|_| anyhow!("Age must be a whole number."))?;
        Ok((name.to_string(), age, self.email.trim().to_string()))
    }

    pub(crate) fn build_line(&self, field_name: &str, field: PersonField) -> Line<'static> {
        let value = self.value(field);
        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.to_string()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, field_style(self.active == field, value.is_empty())),
        ])
    }

    fn value(&self, field: PersonField) -> &str {
        match field {
            PersonField::Name => &self.name,
            PersonField::Age => &self.age,
            PersonField::Email => &self.email,
        }
    }

    pub(crate) fn value_len(&self, field: PersonField) -> usize {
        self.value(field).chars().count()
    }
}

/// One selectable entry in a dropdown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Choice {
    pub(crate) id: i64,
    pub(crate) label: String,
}

impl Choice {
    pub(crate) fn student(student: &Student) -> Self {
        Self {
            id: student.id,
            label: student.to_string(),
        }
    }

    pub(crate) fn instructor(instructor: &Instructor) -> Self {
        Self {
            id: instructor.id,
            label: instructor.to_string(),
        }
    }

    pub(crate) fn course(course: &Course) -> Self {
        Self {
            id: course.id,
            label: course.to_string(),
        }
    }
}

/// A combobox cycled with the arrow keys. When `allow_none` is set the first
/// position stands for "no selection".
#[derive(Clone, Debug, Default)]
pub(crate) struct Dropdown {
    options: Vec<Choice>,
    position: usize,
    allow_none: bool,
}

impl Dropdown {
    pub(crate) fn new(options: Vec<Choice>) -> Self {
        Self {
            options,
            position: 0,
            allow_none: false,
        }
    }

    pub(crate) fn optional(options: Vec<Choice>) -> Self {
        Self {
            options,
            position: 0,
            allow_none: true,
        }
    }

    /// Move the selection to the entry with `id`, if present.
    pub(crate) fn select_id(&mut self, id: Option<i64>) {
        let offset = usize::from(self.allow_none);
        self.position = match id.and_then(|id| self.options.iter().position(|c| c.id == id)) {
            Some(idx) => idx + offset,
            None => 0,
        };
    }

    fn slots(&self) -> usize {
        self.options.len() + usize::from(self.allow_none)
    }

    /// Step through the options, wrapping at both ends.
    pub(crate) fn cycle(&mut self, offset: isize) {
        let slots = self.slots() as isize;
        if slots == 0 {
            return;
        }
        self.position = (self.position as isize + offset).rem_euclid(slots) as usize;
    }

    pub(crate) fn selected(&self) -> Option<&Choice> {
        if self.allow_none {
            self.position.checked_sub(1).and_then(|i| self.options.get(i))
        } else {
            self.options.get(self.position)
        }
    }

    pub(crate) fn selected_id(&self) -> Option<i64> {
        self.selected().map(|choice| choice.id)
    }

    pub(crate) fn display(&self) -> String {
        match self.selected() {
            Some(choice) => choice.label.clone(),
            None if self.options.is_empty() && !self.allow_none => "<nothing to select>".to_string(),
            None => "(none)".to_string(),
        }
    }

    fn build_line(&self, field_name: &str, is_active: bool) -> Line<'static> {
        let style = field_style(is_active, self.selected().is_none());
        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(format!("< {} >", self.display()), style),
        ])
    }
}

/// Form state for creating or editing a course: a text name plus an optional
/// instructor dropdown.
#[derive(Clone, Default)]
pub(crate) struct CourseForm {
    pub(crate) name: String,
    pub(crate) instructor: Dropdown,
    pub(crate) active: CourseField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum CourseField {
    #[default]
    Name,
    Instructor,
}

impl CourseForm {
    pub(crate) fn new(instructors: Vec<Choice>) -> Self {
        Self {
            instructor: Dropdown::optional(instructors),
            ..Self::default()
        }
    }

    pub(crate) fn from_course(course: &Course, instructors: Vec<Choice>) -> Self {
        let mut form = Self::new(instructors);
        form.name = course.name.clone();
        form.instructor.select_id(course.instructor_id);
        form
    }

    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            CourseField::Name => CourseField::Instructor,
            CourseField::Instructor => CourseField::Name,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if self.active != CourseField::Name || ch.is_control() {
            return false;
        }
        self.name.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        if self.active == CourseField::Name {
            self.name.pop();
        }
    }

    /// Arrow keys only move the dropdown when it has focus.
    pub(crate) fn cycle(&mut self, offset: isize) {
        if self.active == CourseField::Instructor {
            self.instructor.cycle(offset);
        }
    }

    pub(crate) fn parse_inputs(&self) -> Result<(String, Option<i64>)> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Course name is required."));
        }
        Ok((name.to_string(), self.instructor.selected_id()))
    }

    pub(crate) fn build_lines(&self) -> Vec<Line<'static>> {
        let name_display = if self.name.is_empty() {
            "<required>".to_string()
        } else {
            self.name.clone()
        };
        vec![
            Line::from(vec![
                Span::raw("Course Name: "),
                Span::styled(
                    name_display,
                    field_style(self.active == CourseField::Name, self.name.is_empty()),
                ),
            ]),
            self.instructor
                .build_line("Instructor", self.active == CourseField::Instructor),
        ]
    }

    pub(crate) fn name_len(&self) -> usize {
        self.name.chars().count()
    }
}

/// What a [`PairForm`] does when submitted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum PairAction {
    /// First dropdown: student, second: course.
    Register,
    /// First dropdown: instructor, second: course.
    AssignInstructor,
}

impl PairAction {
    pub(crate) fn title(self) -> &'static str {
        match self {
            PairAction::Register => "Register Student",
            PairAction::AssignInstructor => "Assign Instructor",
        }
    }

    fn labels(self) -> [&'static str; 2] {
        match self {
            PairAction::Register => ["Student", "Course"],
            PairAction::AssignInstructor => ["Instructor", "Course"],
        }
    }

    fn missing_messages(self) -> [&'static str; 2] {
        match self {
            PairAction::Register => ["Please select a student.", "Please select a course."],
            PairAction::AssignInstructor => {
                ["Please select an instructor.", "Please select a course."]
            }
        }
    }
}

/// Two dropdowns side by side, used by the registration and instructor
/// assignment dialogs.
#[derive(Clone)]
pub(crate) struct PairForm {
    pub(crate) action: PairAction,
    pub(crate) first: Dropdown,
    pub(crate) second: Dropdown,
    pub(crate) second_active: bool,
    pub(crate) error: Option<String>,
}

impl PairForm {
    pub(crate) fn new(action: PairAction, first: Vec<Choice>, second: Vec<Choice>) -> Self {
        Self {
            action,
            first: Dropdown::new(first),
            second: Dropdown::new(second),
            second_active: false,
            error: None,
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        self.second_active = !self.second_active;
    }

    pub(crate) fn cycle(&mut self, offset: isize) {
        if self.second_active {
            self.second.cycle(offset);
        } else {
            self.first.cycle(offset);
        }
        self.error = None;
    }

    /// Both selected ids, in dropdown order.
    pub(crate) fn parse_inputs(&self) -> Result<(i64, i64)> {
        let [first_missing, second_missing] = self.action.missing_messages();
        let first = self.first.selected_id().ok_or_else(|| anyhow!(first_missing))?;
        let second = self.second.selected_id().ok_or_else(|| anyhow!(second_missing))?;
        Ok((first, second))
    }

    pub(crate) fn build_lines(&self) -> Vec<Line<'static>> {
        let [first_label, second_label] = self.action.labels();
        vec![
            self.first.build_line(first_label, !self.second_active),
            self.second.build_line(second_label, self.second_active),
        ]
    }
}

/// What a delete confirmation will remove.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum DeleteTarget {
    Person { kind: PersonKind, id: i64 },
    Course { id: i64 },
    Enrollment { student_id: i64, course_id: i64 },
}

#[derive(Clone, Debug)]
pub(crate) struct ConfirmDelete {
    pub(crate) target: DeleteTarget,
    pub(crate) description: String,
    pub(crate) error: Option<String>,
}

impl ConfirmDelete {
    pub(crate) fn new(target: DeleteTarget, description: String) -> Self {
        Self {
            target,
            description,
            error: None,
        }
    }

    pub(crate) fn prompt(&self) -> String {
        match self.target {
            DeleteTarget::Enrollment { .. } => format!("Unregister {}?", self.description),
            _ => format!("Delete {}?", self.description),
        }
    }
}
