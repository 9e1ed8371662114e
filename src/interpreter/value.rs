use std::{
    cell::RefCell,
    cmp::Ordering,
    fmt::{self, Display},
    mem,
    rc::Rc,
};

pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type RecordRef = Rc<RefCell<Vec<(String, Value)>>>;

/// Storage a variable symbol points at.
pub type Slot = Rc<RefCell<Value>>;

/// Runtime value.
///
/// `clone` is shallow: a cloned array or record shares its storage (and its
/// identity under `=`) with the original. Use `deep_copy` for a value with
/// fresh storage all the way down.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    String(String),
    Array(ArrayRef),
    Record(RecordRef),
}

impl Value {
    /// `nil` is a record with no fields and its own identity.
    pub fn nil() -> Self {
        Value::Record(Rc::new(RefCell::new(vec![])))
    }

    /// An array of `length` deep copies of `fill`. A negative length gives an
    /// empty array.
    pub fn new_array(length: i64, fill: &Value) -> Self {
        let length = usize::try_from(length).unwrap_or(0);
        let elements = (0..length).map(|_| fill.deep_copy()).collect();
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn new_record(fields: Vec<(String, Value)>) -> Self {
        Value::Record(Rc::new(RefCell::new(fields)))
    }

    pub fn deep_copy(&self) -> Value {
        match self {
            Value::Int(value) => Value::Int(*value),
            Value::String(value) => Value::String(value.clone()),
            Value::Array(elements) => Value::Array(Rc::new(RefCell::new(
                elements.borrow().iter().map(Value::deep_copy).collect(),
            ))),
            Value::Record(fields) => Value::Record(Rc::new(RefCell::new(
                fields
                    .borrow()
                    .iter()
                    .map(|(name, value)| (name.clone(), value.deep_copy()))
                    .collect(),
            ))),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
        }
    }

    /// `=` semantics: scalars by value, arrays and records by identity.
    /// `None` when the two values are of different kinds.
    pub fn equals(&self, other: &Value) -> Option<bool> {
        match (self, other) {
            (Value::Int(left), Value::Int(right)) => Some(left == right),
            (Value::String(left), Value::String(right)) => Some(left == right),
            (Value::Array(left), Value::Array(right)) => Some(Rc::ptr_eq(left, right)),
            (Value::Record(left), Value::Record(right)) => Some(Rc::ptr_eq(left, right)),
            _ => None,
        }
    }

    /// Ordering for `< <= > >=`, defined on ints and strings only.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(left), Value::Int(right)) => Some(left.cmp(right)),
            (Value::String(left), Value::String(right)) => Some(left.cmp(right)),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::String(value) => write!(f, "{}", value),
            Value::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Value::Record(fields) => {
                let fields = fields.borrow();
                if fields.is_empty() {
                    return write!(f, "nil");
                }
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} = {}", name, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// A storage location designated by an lvalue.
#[derive(Debug, Clone)]
pub enum Place {
    Variable(Slot),
    Element(ArrayRef, usize),
    Field(RecordRef, usize),
}

impl Place {
    /// Shallow read of the location. `None` when an element or field index
    /// no longer exists.
    pub fn read(&self) -> Option<Value> {
        match self {
            Place::Variable(slot) => Some(slot.borrow().clone()),
            Place::Element(elements, index) => elements.borrow().get(*index).cloned(),
            Place::Field(fields, index) => {
                fields.borrow().get(*index).map(|(_, value)| value.clone())
            }
        }
    }

    /// Deep-copies `source` into the location.
    ///
    /// An array or record already stored there keeps its identity: its
    /// contents are replaced rather than the reference. `None` when an
    /// element or field index no longer exists.
    pub fn store(&self, source: &Value) -> Option<()> {
        let copy = source.deep_copy();
        match self {
            Place::Variable(slot) => {
                overwrite(&mut slot.borrow_mut(), copy);
                Some(())
            }
            Place::Element(elements, index) => {
                let mut elements = elements.borrow_mut();
                overwrite(elements.get_mut(*index)?, copy);
                Some(())
            }
            Place::Field(fields, index) => {
                let mut fields = fields.borrow_mut();
                let (_, target) = fields.get_mut(*index)?;
                overwrite(target, copy);
                Some(())
            }
        }
    }
}

fn overwrite(target: &mut Value, copy: Value) {
    match (target, copy) {
        (Value::Array(existing), Value::Array(fresh)) => {
            let contents = mem::take(&mut *fresh.borrow_mut());
            *existing.borrow_mut() = contents;
        }
        (Value::Record(existing), Value::Record(fresh)) => {
            let contents = mem::take(&mut *fresh.borrow_mut());
            *existing.borrow_mut() = contents;
        }
        (target, copy) => *target = copy,
    }
}
