// src/erreur.rs
//
// Erreurs typées du moteur.
// Toute défaillance remonte de façon synchrone à l'appelant ; le moteur
// ne réessaie jamais et ne mute jamais un contexte sur échec.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErreurCalc {
    /// Littéral malformé ou chiffre hors de la base annoncée.
    Syntaxe(String),
    /// Dénominateur nul en division ou inverse de zéro.
    DivisionParZero,
    /// Argument hors du domaine mathématique (ln, arc trig, ...).
    Domaine(String),
    /// Magnitude ou exposant au-delà des bornes dures, ou série qui
    /// n'a pas convergé sous le plafond d'itérations.
    Debordement,
}

impl fmt::Display for ErreurCalc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErreurCalc::Syntaxe(msg) => write!(f, "entrée invalide: {msg}"),
            ErreurCalc::DivisionParZero => write!(f, "division par zéro"),
            ErreurCalc::Domaine(msg) => write!(f, "hors domaine: {msg}"),
            ErreurCalc::Debordement => write!(f, "dépassement de capacité"),
        }
    }
}

impl std::error::Error for ErreurCalc {}

pub type Resultat<T> = Result<T, ErreurCalc>;
