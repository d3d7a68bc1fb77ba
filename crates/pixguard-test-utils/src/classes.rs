//! Minimal class-file writer for fixtures
//!
//! Writes just enough structure (constant pool, fields with
//! `ConstantValue`, methods with `Code`) for the reader and rewriter tests.
//! Kept independent of `pixguard-classfile` so that crate can use it.

use std::collections::HashMap;

const UTF8: u8 = 1;
const INTEGER: u8 = 3;
const LONG: u8 = 5;
const CLASS: u8 = 7;
const FIELD_REF: u8 = 9;
const METHOD_REF: u8 = 10;
const INTERFACE_METHOD_REF: u8 = 11;
const NAME_AND_TYPE: u8 = 12;

const ACC_PUBLIC: u16 = 0x0001;
const ACC_STATIC: u16 = 0x0008;
const ACC_FINAL: u16 = 0x0010;
const ACC_SUPER: u16 = 0x0020;

#[derive(Debug, Default)]
struct Pool {
    bytes: Vec<u8>,
    index: HashMap<Vec<u8>, u16>,
    next: u16,
}

impl Pool {
    fn new() -> Self {
        Self {
            next: 1,
            ..Self::default()
        }
    }

    fn add(&mut self, entry: Vec<u8>, slots: u16) -> u16 {
        if let Some(i) = self.index.get(&entry) {
            return *i;
        }
        let i = self.next;
        self.bytes.extend_from_slice(&entry);
        self.index.insert(entry, i);
        self.next += slots;
        i
    }

    fn utf8(&mut self, s: &str) -> u16 {
        let mut e = vec![UTF8];
        e.extend_from_slice(&(s.len() as u16).to_be_bytes());
        e.extend_from_slice(s.as_bytes());
        self.add(e, 1)
    }

    fn class(&mut self, name: &str) -> u16 {
        let n = self.utf8(name);
        let mut e = vec![CLASS];
        e.extend_from_slice(&n.to_be_bytes());
        self.add(e, 1)
    }

    fn name_and_type(&mut self, name: &str, desc: &str) -> u16 {
        let n = self.utf8(name);
        let d = self.utf8(desc);
        let mut e = vec![NAME_AND_TYPE];
        e.extend_from_slice(&n.to_be_bytes());
        e.extend_from_slice(&d.to_be_bytes());
        self.add(e, 1)
    }

    fn member_ref(&mut self, tag: u8, owner: &str, name: &str, desc: &str) -> u16 {
        let c = self.class(owner);
        let nt = self.name_and_type(name, desc);
        let mut e = vec![tag];
        e.extend_from_slice(&c.to_be_bytes());
        e.extend_from_slice(&nt.to_be_bytes());
        self.add(e, 1)
    }

    fn integer(&mut self, v: i32) -> u16 {
        let mut e = vec![INTEGER];
        e.extend_from_slice(&v.to_be_bytes());
        self.add(e, 1)
    }

    fn long(&mut self, v: i64) -> u16 {
        let mut e = vec![LONG];
        e.extend_from_slice(&v.to_be_bytes());
        self.add(e, 2)
    }
}

/// Builds a class file byte by byte
#[derive(Debug)]
pub struct ClassBuilder {
    pool: Pool,
    this_class: u16,
    super_class: u16,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
}

impl ClassBuilder {
    /// Class with internal name `name` extending `java/lang/Object`
    pub fn new(name: &str) -> Self {
        Self::with_super(name, "java/lang/Object")
    }

    pub fn with_super(name: &str, super_name: &str) -> Self {
        let mut pool = Pool::new();
        let this_class = pool.class(name);
        let super_class = pool.class(super_name);
        Self {
            pool,
            this_class,
            super_class,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    fn field(mut self, access: u16, name: &str, desc: &str, value: Option<u16>) -> Self {
        let mut f = Vec::new();
        f.extend_from_slice(&access.to_be_bytes());
        f.extend_from_slice(&self.pool.utf8(name).to_be_bytes());
        f.extend_from_slice(&self.pool.utf8(desc).to_be_bytes());
        match value {
            Some(v) => {
                let attr = self.pool.utf8("ConstantValue");
                f.extend_from_slice(&1u16.to_be_bytes());
                f.extend_from_slice(&attr.to_be_bytes());
                f.extend_from_slice(&2u32.to_be_bytes());
                f.extend_from_slice(&v.to_be_bytes());
            }
            None => f.extend_from_slice(&0u16.to_be_bytes()),
        }
        self.fields.push(f);
        self
    }

    /// `public static final int name = value;`
    pub fn int_constant(mut self, name: &str, value: i32) -> Self {
        let v = self.pool.integer(value);
        self.field(ACC_PUBLIC | ACC_STATIC | ACC_FINAL, name, "I", Some(v))
    }

    /// `public static final long name = value;`
    pub fn long_constant(mut self, name: &str, value: i64) -> Self {
        let v = self.pool.long(value);
        self.field(ACC_PUBLIC | ACC_STATIC | ACC_FINAL, name, "J", Some(v))
    }

    /// Non-static int field that still carries a `ConstantValue`
    pub fn instance_int_field(mut self, name: &str, value: i32) -> Self {
        let v = self.pool.integer(value);
        self.field(ACC_PUBLIC | ACC_FINAL, name, "I", Some(v))
    }

    /// `public static int[] name;` with no initializer
    pub fn static_array_field(self, name: &str) -> Self {
        self.field(ACC_PUBLIC | ACC_STATIC, name, "[I", None)
    }

    /// Public method whose body is produced by `body`
    pub fn method(mut self, name: &str, desc: &str, body: impl FnOnce(&mut CodeBuilder<'_>)) -> Self {
        let mut code = CodeBuilder {
            pool: &mut self.pool,
            code: Vec::new(),
        };
        body(&mut code);
        let code = code.code;

        let name = self.pool.utf8(name);
        let desc = self.pool.utf8(desc);
        let attr = self.pool.utf8("Code");

        let mut m = Vec::new();
        m.extend_from_slice(&ACC_PUBLIC.to_be_bytes());
        m.extend_from_slice(&name.to_be_bytes());
        m.extend_from_slice(&desc.to_be_bytes());
        m.extend_from_slice(&1u16.to_be_bytes());
        m.extend_from_slice(&attr.to_be_bytes());
        m.extend_from_slice(&(12 + code.len() as u32).to_be_bytes());
        m.extend_from_slice(&8u16.to_be_bytes()); // max_stack
        m.extend_from_slice(&8u16.to_be_bytes()); // max_locals
        m.extend_from_slice(&(code.len() as u32).to_be_bytes());
        m.extend_from_slice(&code);
        m.extend_from_slice(&0u16.to_be_bytes()); // exception table
        m.extend_from_slice(&0u16.to_be_bytes()); // attributes
        self.methods.push(m);
        self
    }

    /// Abstract method (no `Code` attribute)
    pub fn abstract_method(mut self, name: &str, desc: &str) -> Self {
        let mut m = Vec::new();
        m.extend_from_slice(&(ACC_PUBLIC | 0x0400).to_be_bytes());
        m.extend_from_slice(&self.pool.utf8(name).to_be_bytes());
        m.extend_from_slice(&self.pool.utf8(desc).to_be_bytes());
        m.extend_from_slice(&0u16.to_be_bytes());
        self.methods.push(m);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0xcafe_babe_u32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&52u16.to_be_bytes());
        out.extend_from_slice(&self.pool.next.to_be_bytes());
        out.extend_from_slice(&self.pool.bytes);
        out.extend_from_slice(&(ACC_PUBLIC | ACC_SUPER).to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&(self.fields.len() as u16).to_be_bytes());
        for f in &self.fields {
            out.extend_from_slice(f);
        }
        out.extend_from_slice(&(self.methods.len() as u16).to_be_bytes());
        for m in &self.methods {
            out.extend_from_slice(m);
        }
        out.extend_from_slice(&0u16.to_be_bytes());
        out
    }
}

/// Emits bytecode into a method body
#[derive(Debug)]
pub struct CodeBuilder<'p> {
    pool: &'p mut Pool,
    code: Vec<u8>,
}

impl CodeBuilder<'_> {
    /// Raw opcode
    pub fn op(&mut self, opcode: u8) -> &mut Self {
        self.code.push(opcode);
        self
    }

    /// Raw bytes
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.code.extend_from_slice(bytes);
        self
    }

    /// Current offset in the code array
    pub fn offset(&self) -> usize {
        self.code.len()
    }

    pub fn aload(&mut self, slot: u8) -> &mut Self {
        if slot <= 3 {
            self.op(0x2a + slot)
        } else {
            self.raw(&[0x19, slot])
        }
    }

    /// Smallest instruction that pushes `value`
    pub fn push_int(&mut self, value: i32) -> &mut Self {
        match value {
            -1..=5 => self.op((0x03 + value) as u8),
            -128..=127 => self.raw(&[0x10, value as i8 as u8]),
            -32768..=32767 => {
                let [hi, lo] = (value as i16).to_be_bytes();
                self.raw(&[0x11, hi, lo])
            }
            _ => {
                let i = self.pool.integer(value);
                if let Ok(small) = u8::try_from(i) {
                    self.raw(&[0x12, small])
                } else {
                    let [hi, lo] = i.to_be_bytes();
                    self.raw(&[0x13, hi, lo])
                }
            }
        }
    }

    fn invoke(&mut self, opcode: u8, tag: u8, owner: &str, name: &str, desc: &str) -> &mut Self {
        let [hi, lo] = self.pool.member_ref(tag, owner, name, desc).to_be_bytes();
        self.raw(&[opcode, hi, lo])
    }

    pub fn invokevirtual(&mut self, owner: &str, name: &str, desc: &str) -> &mut Self {
        self.invoke(0xb6, METHOD_REF, owner, name, desc)
    }

    pub fn invokespecial(&mut self, owner: &str, name: &str, desc: &str) -> &mut Self {
        self.invoke(0xb7, METHOD_REF, owner, name, desc)
    }

    pub fn invokestatic(&mut self, owner: &str, name: &str, desc: &str) -> &mut Self {
        self.invoke(0xb8, METHOD_REF, owner, name, desc)
    }

    pub fn invokeinterface(&mut self, owner: &str, name: &str, desc: &str, arg_slots: u8) -> &mut Self {
        self.invoke(0xb9, INTERFACE_METHOD_REF, owner, name, desc);
        self.raw(&[arg_slots, 0])
    }

    pub fn getstatic(&mut self, owner: &str, name: &str, desc: &str) -> &mut Self {
        self.invoke(0xb2, FIELD_REF, owner, name, desc)
    }

    /// `tableswitch` with every target pointing at the instruction after it
    pub fn tableswitch(&mut self, low: i32, high: i32) -> &mut Self {
        let start = self.code.len();
        self.op(0xaa);
        while self.code.len() % 4 != 0 {
            self.code.push(0);
        }
        let cases = (high - low + 1) as usize;
        let len = (self.code.len() - start) + 12 + 4 * cases;
        let target = (len as i32).to_be_bytes();
        self.raw(&target);
        self.raw(&low.to_be_bytes());
        self.raw(&high.to_be_bytes());
        for _ in 0..cases {
            self.raw(&target);
        }
        self
    }

    pub fn ret(&mut self) -> &mut Self {
        self.op(0xb1)
    }
}
