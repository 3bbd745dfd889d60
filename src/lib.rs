//! Noyau exact de calculatrice scientifique en base arbitraire
//!
//! Organisation interne :
//! - erreur.rs       : erreurs typées + alias Resultat
//! - nombre.rs       : entier signé à précision arbitraire (base interne 2^32)
//! - rationnel.rs    : fraction exacte num/den + réduction PGCD
//! - contexte.rs     : base (2..=36), précision, unité d'angle + cache de constantes
//! - conversion.rs   : littéral -> Rationnel et Rationnel -> texte (Fixe/Sci/Ing)
//! - transcendant.rs : exp/ln/trig/hyperboliques par séries rationnelles
//!
//! Pas de flottant natif nulle part : tout passe par Nombre et Rationnel.

pub mod contexte;
pub mod conversion;
pub mod erreur;
pub mod nombre;
pub mod rationnel;
pub mod transcendant;


#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale
pub use contexte::{Contexte, UniteAngle};
pub use conversion::{analyser, formater, ModeAffichage};
pub use erreur::{ErreurCalc, Resultat};
pub use nombre::Nombre;
pub use rationnel::Rationnel;
