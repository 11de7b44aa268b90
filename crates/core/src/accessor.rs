use std::rc::Rc;

use crate::{
    error::{Error, Result},
    form::{ControlRef, FormGroup},
};

/// How a field declares the control it edits.
#[derive(Clone, Debug, Default)]
pub enum Binding {
    #[default]
    Unbound,
    ControlName(String),
    Control(ControlRef),
}

impl Binding {
    pub fn name<S: Into<String>>(name: S) -> Self {
        Binding::ControlName(name.into())
    }
}

/// A binding resolved against its group. Resolution happens once, when the field is created.
#[derive(Clone, Debug)]
pub enum ValueAccessor {
    Named { name: String, control: ControlRef },
    Direct(ControlRef),
}

impl ValueAccessor {
    pub fn resolve(binding: &Binding, group: &FormGroup) -> Result<Option<Self>> {
        match binding {
            Binding::Unbound => Ok(None),
            Binding::ControlName(name) => group
                .get(name)
                .map(|control| {
                    Some(ValueAccessor::Named {
                        name: name.clone(),
                        control,
                    })
                })
                .ok_or_else(|| Error::UnknownControl(name.clone())),
            Binding::Control(control) => Ok(Some(ValueAccessor::Direct(Rc::clone(control)))),
        }
    }

    pub fn control(&self) -> &ControlRef {
        match self {
            ValueAccessor::Named { control, .. } => control,
            ValueAccessor::Direct(control) => control,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            ValueAccessor::Named { name, .. } => Some(name),
            ValueAccessor::Direct(_) => None,
        }
    }

    pub fn value(&self) -> String {
        self.control().borrow().value().to_string()
    }

    pub fn set_value<S: Into<String>>(&self, value: S) {
        self.control().borrow_mut().set_value(value);
    }

    pub fn revision(&self) -> u64 {
        self.control().borrow().revision()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormControl;

    #[test]
    fn resolves_each_binding_kind() {
        let group = FormGroup::new().with_control("name", "n");
        assert!(ValueAccessor::resolve(&Binding::Unbound, &group)
            .unwrap()
            .is_none());

        let named = ValueAccessor::resolve(&Binding::name("name"), &group)
            .unwrap()
            .unwrap();
        assert_eq!(named.name(), Some("name"));
        assert_eq!(named.value(), "n");

        let standalone = FormControl::shared("d");
        let direct = ValueAccessor::resolve(&Binding::Control(standalone.clone()), &group)
            .unwrap()
            .unwrap();
        assert_eq!(direct.name(), None);
        direct.set_value("changed");
        assert_eq!(standalone.borrow().value(), "changed");
    }

    #[test]
    fn unknown_control_name_is_an_error() {
        let group = FormGroup::new();
        let err = ValueAccessor::resolve(&Binding::name("missing"), &group).unwrap_err();
        assert_eq!(err, Error::UnknownControl("missing".into()));
    }

    #[test]
    fn named_accessor_shares_the_group_control() {
        let group = FormGroup::new().with_control("name", "");
        let accessor = ValueAccessor::resolve(&Binding::name("name"), &group)
            .unwrap()
            .unwrap();
        accessor.set_value("typed");
        assert_eq!(group.value("name").as_deref(), Some("typed"));
    }
}
