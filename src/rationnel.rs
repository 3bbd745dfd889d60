// src/rationnel.rs
//
// Fraction exacte : numérateur / dénominateur (deux Nombre).
// - dénominateur strictement positif et non nul ; le signe vit au numérateur
// - valeurs immuables : chaque opération produit une nouvelle valeur
// - la réduction n'est pas systématique : lecture et affichage réduisent
//   toujours, les séries tronquent à chaque pas, et les opérations de base
//   réduisent dès que la taille combinée dépasse SEUIL_REDUCTION

use std::cmp::Ordering;

use crate::erreur::{ErreurCalc, Resultat};
use crate::nombre::Nombre;

/// Au-delà de ce total de chiffres internes (num + den), les opérations de
/// base réduisent leur résultat pour contenir la croissance des chaînes
/// d'opérations.
const SEUIL_REDUCTION: usize = 4096;

#[derive(Clone, Debug)]
pub struct Rationnel {
    num: Nombre,
    den: Nombre,
}

impl Rationnel {
    pub fn nouveau(num: Nombre, den: Nombre) -> Resultat<Self> {
        if den.est_zero() {
            return Err(ErreurCalc::DivisionParZero);
        }
        if den.est_negatif() {
            return Ok(Rationnel {
                num: num.negation(),
                den: den.negation(),
            });
        }
        Ok(Rationnel { num, den })
    }

    pub fn zero() -> Self {
        Rationnel {
            num: Nombre::zero(),
            den: Nombre::un(),
        }
    }

    pub fn un() -> Self {
        Rationnel {
            num: Nombre::un(),
            den: Nombre::un(),
        }
    }

    pub fn de_nombre(n: Nombre) -> Self {
        Rationnel {
            num: n,
            den: Nombre::un(),
        }
    }

    pub fn entier(v: i64) -> Self {
        Rationnel::de_nombre(Nombre::de_i64(v))
    }

    pub fn fraction(n: i64, d: i64) -> Resultat<Self> {
        Rationnel::nouveau(Nombre::de_i64(n), Nombre::de_i64(d))
    }

    pub fn numerateur(&self) -> &Nombre {
        &self.num
    }

    pub fn denominateur(&self) -> &Nombre {
        &self.den
    }

    pub fn est_zero(&self) -> bool {
        self.num.est_zero()
    }

    pub fn est_negatif(&self) -> bool {
        self.num.est_negatif()
    }

    pub fn negation(&self) -> Rationnel {
        Rationnel {
            num: self.num.negation(),
            den: self.den.clone(),
        }
    }

    pub fn abs(&self) -> Rationnel {
        Rationnel {
            num: self.num.abs(),
            den: self.den.clone(),
        }
    }

    /// a/b + c/d = (a·d + c·b)/(b·d)
    pub fn ajouter(&self, autre: &Rationnel) -> Resultat<Rationnel> {
        let gauche = self.num.multiplier(&autre.den)?;
        let droite = autre.num.multiplier(&self.den)?;
        let num = gauche.ajouter(&droite)?;
        let den = self.den.multiplier(&autre.den)?;
        Rationnel { num, den }.reduire_si_enorme()
    }

    pub fn soustraire(&self, autre: &Rationnel) -> Resultat<Rationnel> {
        self.ajouter(&autre.negation())
    }

    pub fn multiplier(&self, autre: &Rationnel) -> Resultat<Rationnel> {
        let num = self.num.multiplier(&autre.num)?;
        let den = self.den.multiplier(&autre.den)?;
        Rationnel { num, den }.reduire_si_enorme()
    }

    /// Inverse : num et den échangés. Inverse de zéro : division par zéro.
    pub fn inverse(&self) -> Resultat<Rationnel> {
        if self.num.est_zero() {
            return Err(ErreurCalc::DivisionParZero);
        }
        Rationnel::nouveau(self.den.clone(), self.num.clone())
    }

    pub fn diviser(&self, autre: &Rationnel) -> Resultat<Rationnel> {
        self.multiplier(&autre.inverse()?)
    }

    /// Réduction PGCD : dénominateur positif, num/den premiers entre eux.
    pub fn reduire(&self) -> Resultat<Rationnel> {
        if self.num.est_zero() {
            return Ok(Rationnel::zero());
        }
        let (num, den) = Nombre::aligner_pour_quotient(&self.num, &self.den);
        let g = num.pgcd(&den)?;
        if g.est_un() {
            return Ok(Rationnel { num, den });
        }
        let (qn, _) = num.div_rem(&g)?;
        let (qd, _) = den.div_rem(&g)?;
        Ok(Rationnel { num: qn, den: qd })
    }

    fn reduire_si_enorme(self) -> Resultat<Rationnel> {
        if self.num.nb_chiffres() + self.den.nb_chiffres() > SEUIL_REDUCTION {
            self.reduire()
        } else {
            Ok(self)
        }
    }

    /// Ordre de valeur via produits croisés (dénominateurs positifs).
    pub fn comparer(&self, autre: &Rationnel) -> Resultat<Ordering> {
        let gauche = self.num.multiplier(&autre.den)?;
        let droite = autre.num.multiplier(&self.den)?;
        Ok(gauche.comparer(&droite))
    }

    pub fn egal(&self, autre: &Rationnel) -> Resultat<bool> {
        Ok(self.comparer(autre)? == Ordering::Equal)
    }

    /// Quotient entier tronqué vers zéro.
    pub fn partie_entiere(&self) -> Resultat<Nombre> {
        let (q, _) = self.num.div_rem(&self.den)?;
        Ok(q)
    }

    pub fn est_entier(&self) -> Resultat<bool> {
        let (_, r) = self.num.div_rem(&self.den)?;
        Ok(r.est_zero())
    }

    /// Arrondi à l'entier le plus proche, moitié loin de zéro.
    pub fn arrondi_entier(&self) -> Resultat<Nombre> {
        let (q, r) = self.num.abs().div_rem(&self.den)?;
        let double = r.multiplier_petit(2)?;
        let q = if double.comparer_magnitude(&self.den) != Ordering::Less {
            q.ajouter(&Nombre::un())?
        } else {
            q
        };
        Ok(if self.est_negatif() { q.negation() } else { q })
    }

    /// x^n par carrés successifs ; n < 0 passe par l'inverse.
    pub fn puissance_entiere(&self, exposant: i64) -> Resultat<Rationnel> {
        if exposant == 0 {
            return Ok(Rationnel::un());
        }
        if exposant < 0 {
            let oppose = exposant.checked_neg().ok_or(ErreurCalc::Debordement)?;
            return self.puissance_entiere(oppose)?.inverse();
        }
        let mut e = exposant as u64;
        let mut acc = Rationnel::un();
        let mut b = self.clone();
        while e > 0 {
            if (e & 1) == 1 {
                acc = acc.multiplier(&b)?;
            }
            e >>= 1;
            if e > 0 {
                b = b.multiplier(&b)?;
            }
        }
        Ok(acc)
    }

    /// Borne les deux mantisses à m chiffres internes en retirant le même
    /// nombre de chiffres de poids faible des deux côtés : le quotient est
    /// conservé à une erreur relative sous B^-m près.
    pub fn tronquer(&self, m: usize) -> Rationnel {
        if self.num.est_zero() {
            return Rationnel::zero();
        }
        let minimum = self.num.nb_chiffres().min(self.den.nb_chiffres());
        if minimum <= m {
            return self.clone();
        }
        let exces = minimum - m;
        let num = self.num.retirer_chiffres_bas(exces);
        let den = self.den.retirer_chiffres_bas(exces);
        if num.est_zero() || den.est_zero() {
            // garde-fou : ne doit pas arriver (minimum > m >= 1)
            return self.clone();
        }
        Rationnel { num, den }
    }
}

/* ------------------------ Tests unitaires ------------------------ */
