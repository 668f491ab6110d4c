use crate::{
    genutil::{GenesisState, GenesisStateField, GENESIS_STATE},
    FieldDescriptor, MessageDescriptor, OneofDescriptor, ReflectError, ReflectMessage,
    RepeatedField, Value,
};

impl GenesisState {
    fn is_populated(&self, field: GenesisStateField) -> bool {
        match field {
            GenesisStateField::GenTxs => !self.gen_txs.is_empty(),
        }
    }

    fn field_value(&self, field: GenesisStateField) -> Value<'_> {
        match field {
            GenesisStateField::GenTxs => Value::from(RepeatedField::from_slice(&self.gen_txs)),
        }
    }
}

impl ReflectMessage for GenesisState {
    fn descriptor(&self) -> MessageDescriptor {
        GENESIS_STATE.clone()
    }

    fn range(&self, visit: &mut dyn FnMut(&FieldDescriptor, Value<'_>) -> bool) {
        for &field in GenesisStateField::ALL.iter() {
            if self.is_populated(field) && !visit(field.descriptor(), self.field_value(field)) {
                return;
            }
        }
    }

    fn has_field(&self, field: &FieldDescriptor) -> Result<bool, ReflectError> {
        let field = GenesisStateField::from_descriptor(field)?;
        Ok(self.is_populated(field))
    }

    fn get_field(&self, field: &FieldDescriptor) -> Result<Value<'_>, ReflectError> {
        let field = GenesisStateField::from_descriptor(field)?;
        Ok(self.field_value(field))
    }

    fn set_field(&mut self, field: &FieldDescriptor, value: Value<'_>) -> Result<(), ReflectError> {
        match GenesisStateField::from_descriptor(field)? {
            GenesisStateField::GenTxs => {
                let list = value
                    .into_list()
                    .map_err(|v| ReflectError::type_mismatch("list", v.kind_name()))?
                    .downcast::<Vec<u8>>()
                    .map_err(|l| ReflectError::type_mismatch("bytes", l.element_kind()))?;
                self.gen_txs = list.into_vec()?;
            }
        }
        Ok(())
    }

    fn clear_field(&mut self, field: &FieldDescriptor) -> Result<(), ReflectError> {
        match GenesisStateField::from_descriptor(field)? {
            GenesisStateField::GenTxs => self.gen_txs = Vec::new(),
        }
        Ok(())
    }

    fn get_field_mut(&mut self, field: &FieldDescriptor) -> Result<Value<'_>, ReflectError> {
        match GenesisStateField::from_descriptor(field)? {
            GenesisStateField::GenTxs => {
                Ok(Value::from(RepeatedField::from_mut(&mut self.gen_txs)))
            }
        }
    }

    fn new_field(&self, field: &FieldDescriptor) -> Result<Value<'static>, ReflectError> {
        match GenesisStateField::from_descriptor(field)? {
            GenesisStateField::GenTxs => {
                Ok(Value::from(RepeatedField::<Vec<u8>>::from_vec(Vec::new())))
            }
        }
    }

    fn which_oneof(
        &self,
        oneof: &OneofDescriptor,
    ) -> Result<Option<FieldDescriptor>, ReflectError> {
        // no oneofs are declared, so any oneof belongs to another message
        Err(ReflectError::invalid_oneof(&GENESIS_STATE, oneof))
    }

    fn unknown_fields(&self) -> &[u8] {
        &self.unknown_fields
    }

    fn set_unknown_fields(&mut self, unknown_fields: Vec<u8>) {
        self.unknown_fields = unknown_fields;
    }
}
